#![deny(missing_docs)]
//! Per-principal rate limiting and pattern-based input sanitization.
//!
//! Both are advisory: neither talks to a tool registry or a routing
//! entry directly. Callers consult [`RateLimiter::check_and_consume`]
//! before admitting a request and [`Sanitizer::classify_text`] before
//! trusting user-supplied text, then apply their own blocking policy
//! against a tool's `trust_level`/`security_scope`.

mod rate_limiter;
mod sanitizer;

pub use rate_limiter::{RateLimitDecision, RateLimitWindow, RateLimiter};
pub use sanitizer::{RiskLevel, SanitizationVerdict, Sanitizer};
