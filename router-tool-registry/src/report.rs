//! `LoadReport`: per-unit discovery outcomes.

use router_types::ErrorKind;

/// One unit that failed to load.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    /// Path to the offending `*.toml` file.
    pub unit_path: String,
    /// A human-readable reason.
    pub error_message: String,
    /// The failure's classification.
    pub error_kind: ErrorKind,
}

/// The result of one discovery pass: how many units loaded, and why the
/// rest didn't. Discovery never aborts on a single unit's failure.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Units that loaded successfully.
    pub loaded_count: usize,
    /// Units that did not, with a reason each.
    pub failed: Vec<LoadFailure>,
}
