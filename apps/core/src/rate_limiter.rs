use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Sliding-window request budget, tracked per key.
///
/// Used to keep calls to the external extraction service under the
/// provider's per-minute quota.
pub struct RateLimiter {
    /// Timestamps of accepted requests, per key.
    requests: HashMap<String, Vec<Instant>>,
    /// Maximum number of requests accepted within `window`.
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        RateLimiter {
            requests: HashMap::new(),
            limit,
            window,
        }
    }

    /// Budget of `limit` requests per rolling minute.
    pub fn per_minute(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    fn prune(&mut self, key: &str, now: Instant) -> &mut Vec<Instant> {
        let window = self.window;
        let timestamps = self.requests.entry(key.to_string()).or_default();
        timestamps.retain(|&t| now.duration_since(t) < window);
        timestamps
    }

    /// Records a request for `key` if the budget allows it.
    ///
    /// Returns `false` (and records nothing) once the window is full.
    pub fn check(&mut self, key: &str) -> bool {
        let now = Instant::now();
        let limit = self.limit;
        let timestamps = self.prune(key, now);

        if timestamps.len() < limit {
            timestamps.push(now);
            true
        } else {
            false
        }
    }

    /// How long until `key` may make another request. `None` when it may now.
    pub fn retry_after(&mut self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let limit = self.limit;
        let window = self.window;
        let timestamps = self.prune(key, now);

        if timestamps.len() < limit {
            return None;
        }
        timestamps
            .first()
            .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_rate_limiter_allows_requests_within_limit() {
        let mut limiter = RateLimiter::per_minute(3);
        for _ in 0..3 {
            assert!(limiter.check("llama-3.1-8b-instant"));
        }
        assert!(!limiter.check("llama-3.1-8b-instant"));
        assert!(limiter.retry_after("llama-3.1-8b-instant").is_some());
    }

    #[test]
    fn test_rate_limiter_keys_are_independent() {
        let mut limiter = RateLimiter::per_minute(1);
        assert!(limiter.check("model-a"));
        assert!(limiter.check("model-b"));
        assert!(!limiter.check("model-a"));
    }

    #[test]
    fn test_rate_limiter_resets_after_window() {
        let mut limiter = RateLimiter::new(2, Duration::from_millis(50));
        assert!(limiter.check("delegate"));
        assert!(limiter.check("delegate"));
        assert!(!limiter.check("delegate"));

        thread::sleep(Duration::from_millis(60));

        assert!(limiter.retry_after("delegate").is_none());
        assert!(limiter.check("delegate"));
    }

    #[test]
    fn test_zero_budget_always_refuses() {
        let mut limiter = RateLimiter::per_minute(0);
        assert!(!limiter.check("delegate"));
    }
}
