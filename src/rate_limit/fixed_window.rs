use crate::errors::{AppError, Result};
use crate::rate_limit::store::{WindowEntry, WindowStore};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Window length and request ceiling for one kind of request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitPolicy {
    pub window_ms: u64,
    pub max_requests: u64,
}

impl RateLimitPolicy {
    pub fn per_minute(max_requests: u64) -> Self {
        Self {
            window_ms: 60 * 1000,
            max_requests,
        }
    }

    /// Reject policies that would deny everything or never reset
    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(AppError::ValidationError(
                "window_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_requests == 0 {
            return Err(AppError::ValidationError(
                "max_requests must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::per_minute(60)
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// The rate limit (max requests)
    pub limit: u64,
    /// Number of requests remaining in the current window
    pub remaining: u64,
    /// Unix milliseconds when the window resets
    pub reset_at: u64,
    /// Requests counted in the window so far
    pub count: u64,
}

impl RateLimitDecision {
    fn from_entry(entry: WindowEntry, policy: &RateLimitPolicy) -> Self {
        let allowed = entry.count <= policy.max_requests;
        let remaining = if allowed {
            policy.max_requests - entry.count
        } else {
            0
        };

        Self {
            allowed,
            limit: policy.max_requests,
            remaining,
            reset_at: entry.reset_at,
            count: entry.count,
        }
    }

    /// Whole seconds until the window resets, at least one
    pub fn retry_after_secs(&self, now: u64) -> u64 {
        let wait_ms = self.reset_at.saturating_sub(now);
        wait_ms.div_ceil(1000).max(1)
    }

    /// Reset instant as unix seconds, for `X-RateLimit-Reset`
    pub fn reset_unix_secs(&self) -> u64 {
        self.reset_at.div_ceil(1000)
    }
}

/// Current unix time in milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Fixed-window limiter over a pluggable window store
#[derive(Clone)]
pub struct FixedWindowLimiter {
    store: Arc<dyn WindowStore>,
}

impl FixedWindowLimiter {
    /// Create a limiter over a store
    pub fn new(store: Arc<dyn WindowStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn WindowStore> {
        self.store.clone()
    }

    /// Count a request for `key` and decide whether it may proceed
    pub async fn check(&self, key: &str, policy: &RateLimitPolicy) -> Result<RateLimitDecision> {
        self.check_at(key, policy, now_millis()).await
    }

    /// Same as [`check`](Self::check) with an explicit clock
    pub async fn check_at(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: u64,
    ) -> Result<RateLimitDecision> {
        tracing::debug!(
            key = %key,
            limit = %policy.max_requests,
            window_ms = %policy.window_ms,
            "Checking rate limit"
        );

        let entry = self.store.hit(key, now, policy.window_ms).await?;
        let decision = RateLimitDecision::from_entry(entry, policy);

        tracing::debug!(
            key = %key,
            allowed = %decision.allowed,
            count = %decision.count,
            remaining = %decision.remaining,
            "Rate limit check result"
        );

        Ok(decision)
    }

    /// Reset rate limit for a specific key
    pub async fn reset(&self, key: &str) -> Result<()> {
        self.store.remove(key).await?;
        tracing::info!(key = %key, "Rate limit reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::store::InMemoryWindowStore;

    fn limiter() -> FixedWindowLimiter {
        FixedWindowLimiter::new(Arc::new(InMemoryWindowStore::new()))
    }

    #[tokio::test]
    async fn test_third_call_over_limit_of_two_is_denied() {
        let limiter = limiter();
        let policy = RateLimitPolicy {
            window_ms: 1000,
            max_requests: 2,
        };

        let results: Vec<(bool, u64)> = {
            let mut out = Vec::new();
            for _ in 0..3 {
                let d = limiter.check_at("ip1", &policy, 5_000).await.unwrap();
                out.push((d.allowed, d.remaining));
            }
            out
        };

        assert_eq!(results, vec![(true, 1), (true, 0), (false, 0)]);
    }

    #[tokio::test]
    async fn test_first_n_allowed_then_denied() {
        let limiter = limiter();
        let policy = RateLimitPolicy::per_minute(5);

        for i in 1..=5 {
            let d = limiter.check_at("route-ip", &policy, 0).await.unwrap();
            assert!(d.allowed, "Request {} should be allowed", i);
            assert_eq!(d.count, i);
        }

        let denied = limiter.check_at("route-ip", &policy, 10).await.unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.limit, 5);
        assert_eq!(denied.reset_at, 60_000);
    }

    #[tokio::test]
    async fn test_window_expiry_starts_fresh() {
        let limiter = limiter();
        let policy = RateLimitPolicy {
            window_ms: 1000,
            max_requests: 1,
        };

        assert!(limiter.check_at("k", &policy, 0).await.unwrap().allowed);
        assert!(!limiter.check_at("k", &policy, 500).await.unwrap().allowed);

        let fresh = limiter.check_at("k", &policy, 1001).await.unwrap();
        assert!(fresh.allowed);
        assert_eq!(fresh.count, 1);
        assert_eq!(fresh.reset_at, 2001);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter();
        let policy = RateLimitPolicy {
            window_ms: 1000,
            max_requests: 1,
        };

        assert!(limiter.check_at("get-listing-a", &policy, 0).await.unwrap().allowed);
        assert!(limiter.check_at("get-listing-b", &policy, 0).await.unwrap().allowed);
        assert!(!limiter.check_at("get-listing-a", &policy, 0).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_reset_clears_key() {
        let limiter = limiter();
        let policy = RateLimitPolicy {
            window_ms: 1000,
            max_requests: 1,
        };

        limiter.check_at("k", &policy, 0).await.unwrap();
        limiter.reset("k").await.unwrap();

        assert!(limiter.check_at("k", &policy, 1).await.unwrap().allowed);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let decision = RateLimitDecision {
            allowed: false,
            limit: 2,
            remaining: 0,
            reset_at: 10_500,
            count: 3,
        };

        assert_eq!(decision.retry_after_secs(9_000), 2);
        assert_eq!(decision.retry_after_secs(10_500), 1);
        assert_eq!(decision.retry_after_secs(20_000), 1);
        assert_eq!(decision.reset_unix_secs(), 11);
    }

    #[test]
    fn test_policy_validation() {
        assert!(RateLimitPolicy::per_minute(10).validate().is_ok());
        assert!(RateLimitPolicy { window_ms: 0, max_requests: 1 }.validate().is_err());
        assert!(RateLimitPolicy { window_ms: 1, max_requests: 0 }.validate().is_err());
    }
}
