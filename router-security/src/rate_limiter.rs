//! Per-principal sliding-window rate limiter.
//!
//! One `Mutex<VecDeque<Instant>>` per principal behind a sharded `DashMap`,
//! matching the pack's `dashmap`/`parking_lot` shared-resource idiom for
//! "one lock per principal" rather than a single global lock.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

/// The outcome of [`RateLimiter::check_and_consume`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLimitDecision {
    /// The call is admitted; an event was recorded.
    Allow,
    /// The call is denied. No event was recorded.
    Deny {
        /// Seconds until the oldest event in the window expires.
        retry_after_seconds: f64,
        /// Always `0` — a denied call leaves no remaining budget this window.
        remaining: u32,
    },
}

/// A snapshot of one principal's current window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitWindow {
    /// Admissions still available in the current window.
    pub remaining: u32,
    /// Denials this principal has accumulated since the last `reset`.
    pub violations: u64,
}

struct PrincipalState {
    events: VecDeque<Instant>,
    violations: u64,
}

impl PrincipalState {
    fn new() -> Self {
        Self {
            events: VecDeque::new(),
            violations: 0,
        }
    }
}

/// Sliding-window admission control, safe under concurrent access from
/// many principals.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    principals: DashMap<String, Mutex<PrincipalState>>,
}

impl RateLimiter {
    /// A limiter admitting at most `max_requests` events per
    /// `window_seconds`-second sliding window, per principal.
    #[must_use]
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_seconds),
            principals: DashMap::new(),
        }
    }

    /// Drop expired timestamps, then admit iff the window still has room.
    pub fn check_and_consume(&self, principal: &str) -> RateLimitDecision {
        let entry = self
            .principals
            .entry(principal.to_string())
            .or_insert_with(|| Mutex::new(PrincipalState::new()));
        let mut state = entry.lock();

        let now = Instant::now();
        evict_expired(&mut state.events, now, self.window);

        if (state.events.len() as u32) < self.max_requests {
            state.events.push_back(now);
            RateLimitDecision::Allow
        } else {
            state.violations += 1;
            let oldest = *state.events.front().expect("len >= max_requests > 0 implies non-empty");
            let retry_after = (self.window.saturating_sub(now.duration_since(oldest))).as_secs_f64();
            RateLimitDecision::Deny {
                retry_after_seconds: retry_after,
                remaining: 0,
            }
        }
    }

    /// The current remaining budget and accumulated violation count.
    #[must_use]
    pub fn stats_for(&self, principal: &str) -> RateLimitWindow {
        let Some(entry) = self.principals.get(principal) else {
            return RateLimitWindow {
                remaining: self.max_requests,
                violations: 0,
            };
        };
        let mut state = entry.lock();
        evict_expired(&mut state.events, Instant::now(), self.window);
        RateLimitWindow {
            remaining: self.max_requests.saturating_sub(state.events.len() as u32),
            violations: state.violations,
        }
    }

    /// Clear `principal`'s window and violation count.
    pub fn reset(&self, principal: &str) {
        self.principals.remove(principal);
    }
}

fn evict_expired(events: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = events.front() {
        if now.duration_since(front) >= window {
            events.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_max_requests_then_denies() {
        let limiter = RateLimiter::new(3, 10);
        assert_eq!(limiter.check_and_consume("alice"), RateLimitDecision::Allow);
        assert_eq!(limiter.check_and_consume("alice"), RateLimitDecision::Allow);
        assert_eq!(limiter.check_and_consume("alice"), RateLimitDecision::Allow);
        match limiter.check_and_consume("alice") {
            RateLimitDecision::Deny { remaining, retry_after_seconds } => {
                assert_eq!(remaining, 0);
                assert!(retry_after_seconds <= 10.0);
            }
            other => panic!("expected Deny, got {other:?}"),
        }
    }

    #[test]
    fn principals_are_independent() {
        let limiter = RateLimiter::new(1, 10);
        assert_eq!(limiter.check_and_consume("alice"), RateLimitDecision::Allow);
        assert_eq!(limiter.check_and_consume("bob"), RateLimitDecision::Allow);
    }

    #[test]
    fn reset_clears_the_window_and_violation_count() {
        let limiter = RateLimiter::new(1, 10);
        limiter.check_and_consume("alice");
        let denied = limiter.check_and_consume("alice");
        assert!(matches!(denied, RateLimitDecision::Deny { .. }));
        assert_eq!(limiter.stats_for("alice").violations, 1);

        limiter.reset("alice");
        assert_eq!(limiter.stats_for("alice"), RateLimitWindow { remaining: 1, violations: 0 });
        assert_eq!(limiter.check_and_consume("alice"), RateLimitDecision::Allow);
    }

    #[test]
    fn stats_for_an_unseen_principal_reports_full_budget() {
        let limiter = RateLimiter::new(5, 10);
        assert_eq!(limiter.stats_for("never-seen"), RateLimitWindow { remaining: 5, violations: 0 });
    }
}
