//! The shared error-kind taxonomy used across every public operation.

use std::fmt;

/// Classification of a failure, per the router's error handling design.
///
/// Exactly one kind is attached to every unsuccessful result the system
/// returns. `Backend` and `Timeout` are the only kinds the execution
/// engine ever retries (at most once, via a fallback candidate); all
/// others are surfaced to the caller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Parameter schema violation. Never retried.
    Validation,
    /// Rate-limit deny, approval deny, or sanitizer block. Never retried.
    NotAuthorized,
    /// All routing candidates were filtered out. Never retried.
    ModelUnavailable,
    /// Adapter call failed at the backend level (transport, 5xx, malformed body).
    /// Retried at most once via the fallback candidate.
    Backend,
    /// Deadline exceeded. Retried at most once if the deadline still permits.
    Timeout,
    /// Tool body returned an unsuccessful envelope. Never retried.
    ToolExecution,
    /// Invariant violation. Logged at error level, surfaced as opaque.
    Internal,
}

impl ErrorKind {
    /// Whether the execution engine may attempt exactly one fallback for
    /// a failure of this kind.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Backend | Self::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::NotAuthorized => "not_authorized",
            Self::ModelUnavailable => "model_unavailable",
            Self::Backend => "backend",
            Self::Timeout => "timeout",
            Self::ToolExecution => "tool_execution",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A typed, user-visible failure.
///
/// Every public operation returns either a value or a `RouterError`.
/// `message` must have secrets and raw network error detail scrubbed
/// before it reaches a caller; full detail belongs in structured logs
/// under the request's trace id, not in this struct.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RouterError {
    /// The error classification.
    pub kind: ErrorKind,
    /// A scrubbed, human-readable message.
    pub message: String,
}

impl RouterError {
    /// Construct a new typed error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for `ErrorKind::Validation`.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Shorthand for `ErrorKind::NotAuthorized`.
    #[must_use]
    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthorized, message)
    }

    /// Shorthand for `ErrorKind::ModelUnavailable`.
    #[must_use]
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelUnavailable, message)
    }

    /// Shorthand for `ErrorKind::Backend`.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Backend, message)
    }

    /// Shorthand for `ErrorKind::Timeout`.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Shorthand for `ErrorKind::ToolExecution`.
    #[must_use]
    pub fn tool_execution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolExecution, message)
    }

    /// Shorthand for `ErrorKind::Internal`.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the execution engine may attempt one fallback for this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
