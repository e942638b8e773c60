//! Per-tool execution counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// A point-in-time snapshot of one tool's execution counters.
///
/// Both counters only track calls that actually reached the tool body —
/// a call a validation or confirmation stage rejects before `tool.call()`
/// runs is not an execution of the tool and leaves these untouched.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ToolStats {
    /// Calls whose tool body ran to a verdict (success or failure).
    pub executions: u64,
    /// Calls whose tool body ran and ended in failure.
    pub errors: u64,
}

impl ToolStats {
    /// `1 - errors/executions`, or `1.0` when there have been no calls yet.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.executions == 0 {
            1.0
        } else {
            (self.executions - self.errors) as f64 / self.executions as f64
        }
    }
}

/// The live, concurrently-updated counter pair backing [`ToolStats`].
#[derive(Debug, Default)]
pub(crate) struct LiveToolStats {
    executions: AtomicU64,
    errors: AtomicU64,
}

impl LiveToolStats {
    pub(crate) fn record(&self, success: bool) {
        self.executions.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> ToolStats {
        ToolStats {
            executions: self.executions.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
