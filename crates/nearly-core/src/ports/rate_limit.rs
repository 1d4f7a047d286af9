//! Rate limiting port.

use async_trait::async_trait;
use std::time::Duration;

/// Counts requests per key (client IP on the auth routes).
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check whether a request from `key` is allowed and count it.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Best-effort estimate; backends that cannot read their bucket report the
    /// full quota.
    pub remaining: u32,
    pub reset_after: Duration,
}

impl RateLimitResult {
    pub fn allow(remaining: u32, reset_after: Duration) -> Self {
        Self {
            allowed: true,
            remaining,
            reset_after,
        }
    }

    pub fn deny(wait: Duration) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_after: wait,
        }
    }

    /// Whole seconds for a `Retry-After` header, rounded up, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        let rounded = if self.reset_after.subsec_nanos() > 0 { secs + 1 } else { secs };
        rounded.max(1)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(RateLimitResult::deny(Duration::from_millis(1500)).retry_after_secs(), 2);
        assert_eq!(RateLimitResult::deny(Duration::from_secs(30)).retry_after_secs(), 30);
        assert_eq!(RateLimitResult::deny(Duration::ZERO).retry_after_secs(), 1);
    }

    #[test]
    fn test_deny_leaves_nothing() {
        let result = RateLimitResult::deny(Duration::from_secs(5));
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
    }
}
