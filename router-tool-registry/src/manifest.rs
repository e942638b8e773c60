//! The on-disk shape of one tool-unit manifest.

use serde::Deserialize;

/// One `*.toml` file beneath a category directory.
///
/// Names the compiled-in constructor (`builtin`) the registry should
/// resolve and instantiate; the constructed tool's own [`router_types::ToolManifest`]
/// is the source of truth for everything else (description, parameters,
/// trust level). `name` here is only a cross-check against that manifest
/// so a unit can't silently point at the wrong builtin.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolUnitManifest {
    /// Expected to equal the constructed tool's `manifest().name`.
    pub name: String,
    /// The key looked up in the compiled-in factory map.
    pub builtin: String,
}
