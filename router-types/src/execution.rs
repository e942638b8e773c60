//! `ExecutionResult`, the value object returned by the execution engine.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// The outcome of a single model execution attempt (or attempt chain).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the request ultimately succeeded.
    pub success: bool,
    /// Generated text. Empty if and only if `!success`.
    pub response_text: String,
    /// The model that produced `response_text`, or that the last attempt targeted.
    pub model_id: String,
    /// Wall-clock time across all attempts, in seconds.
    pub elapsed_seconds: f64,
    /// Present if and only if `!success`.
    pub error_kind: Option<ErrorKind>,
    /// Present if and only if `!success`.
    pub error_message: Option<String>,
    /// Whether a fallback attempt was made.
    pub fallback_used: bool,
}

impl ExecutionResult {
    /// Build a successful result.
    #[must_use]
    pub fn success(
        response_text: impl Into<String>,
        model_id: impl Into<String>,
        elapsed_seconds: f64,
        fallback_used: bool,
    ) -> Self {
        Self {
            success: true,
            response_text: response_text.into(),
            model_id: model_id.into(),
            elapsed_seconds,
            error_kind: None,
            error_message: None,
            fallback_used,
        }
    }

    /// Build a failed result.
    #[must_use]
    pub fn failure(
        model_id: impl Into<String>,
        elapsed_seconds: f64,
        error_kind: ErrorKind,
        error_message: impl Into<String>,
        fallback_used: bool,
    ) -> Self {
        Self {
            success: false,
            response_text: String::new(),
            model_id: model_id.into(),
            elapsed_seconds,
            error_kind: Some(error_kind),
            error_message: Some(error_message.into()),
            fallback_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_error_fields() {
        let r = ExecutionResult::success("hi", "m1", 0.1, false);
        assert!(r.success);
        assert!(r.error_kind.is_none());
        assert!(r.error_message.is_none());
        assert!(!r.response_text.is_empty());
    }

    #[test]
    fn failure_has_empty_response_text() {
        let r = ExecutionResult::failure("m1", 0.1, ErrorKind::Backend, "boom", true);
        assert!(!r.success);
        assert!(r.response_text.is_empty());
        assert_eq!(r.error_kind, Some(ErrorKind::Backend));
        assert!(r.fallback_used);
    }
}
