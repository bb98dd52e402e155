//! Dial retry policy.
//!
//! # Responsibilities
//! - Bound how many times a call may dial before giving up
//! - Decide how long to wait between attempts
//!
//! # Design Decisions
//! - Only dials are retried; a call that reached the backend is never re-sent
//! - Each attempt draws a fresh endpoint, so a dead replica is routed around
//! - Linear (fixed) backoff; attempts are few and the pool is small

use std::time::Duration;

use crate::config::DialConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialRetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl DialRetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &DialConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.backoff_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the 1-based `attempt`. The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.backoff
        }
    }
}

impl Default for DialRetryPolicy {
    fn default() -> Self {
        Self::from_config(&DialConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dial_config() {
        let policy = DialRetryPolicy::default();
        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_secs(1));
    }

    #[test]
    fn zero_attempts_still_dials_once() {
        let policy = DialRetryPolicy::new(0, Duration::from_millis(5));
        assert_eq!(policy.max_attempts(), 1);
    }
}
