//! In-memory rate limiter with per-endpoint quotas

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// A request quota: at most `max_requests` per `window`.
#[derive(Debug, Clone, Copy)]
pub struct RateQuota {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateQuota {
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

/// Rate limiter entry
#[derive(Debug)]
struct RateLimiterEntry {
    /// Requests seen in the current window
    count: u32,
    /// When the current window opened
    window_start: Instant,
}

/// Keyed in-memory rate limiter. Each scope (roughly: endpoint group)
/// carries its own quota; keys within a scope are typically user ids or
/// usernames.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    quotas: Arc<HashMap<&'static str, RateQuota>>,
    default_quota: RateQuota,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a rate limiter with explicit scope quotas.
    pub fn new(quotas: HashMap<&'static str, RateQuota>, default_quota: RateQuota) -> Self {
        Self {
            quotas: Arc::new(quotas),
            default_quota,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The quotas the service has always enforced per endpoint group.
    pub fn with_default_quotas() -> Self {
        let quotas = HashMap::from([
            ("auth", RateQuota::per_minute(10)),
            ("password-reset", RateQuota::per_minute(5)),
            ("product-list", RateQuota::per_minute(20)),
            ("product-mutate", RateQuota::per_minute(10)),
            ("friend-list", RateQuota::per_minute(10)),
            ("friend-mutate", RateQuota::per_minute(5)),
            ("profile-view", RateQuota::per_minute(10)),
            ("profile-edit", RateQuota::per_minute(5)),
            ("account-delete", RateQuota::per_minute(2)),
            ("community", RateQuota::per_minute(15)),
            ("current-user", RateQuota::per_minute(10)),
        ]);

        Self::new(quotas, RateQuota::per_minute(30))
    }

    /// Record a request against `scope` for `key` and report whether it
    /// fits the quota.
    pub async fn is_allowed(&self, scope: &'static str, key: &str) -> bool {
        let quota = self.quotas.get(scope).copied().unwrap_or(self.default_quota);

        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries
            .entry(format!("{scope}:{key}"))
            .or_insert(RateLimiterEntry {
                count: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) >= quota.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= quota.max_requests {
            warn!("Rate limit hit for {scope}:{key}");
            return false;
        }

        entry.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter_with(scope_quota: RateQuota) -> RateLimiter {
        RateLimiter::new(
            HashMap::from([("test", scope_quota)]),
            RateQuota::per_minute(1),
        )
    }

    #[tokio::test]
    async fn requests_under_the_quota_are_allowed() {
        let limiter = limiter_with(RateQuota::per_minute(3));
        for _ in 0..3 {
            assert!(limiter.is_allowed("test", "alice").await);
        }
    }

    #[tokio::test]
    async fn requests_over_the_quota_are_blocked() {
        let limiter = limiter_with(RateQuota::per_minute(2));
        assert!(limiter.is_allowed("test", "alice").await);
        assert!(limiter.is_allowed("test", "alice").await);
        assert!(!limiter.is_allowed("test", "alice").await);
    }

    #[tokio::test]
    async fn keys_are_tracked_independently() {
        let limiter = limiter_with(RateQuota::per_minute(1));
        assert!(limiter.is_allowed("test", "alice").await);
        assert!(limiter.is_allowed("test", "bob").await);
        assert!(!limiter.is_allowed("test", "alice").await);
    }

    #[tokio::test]
    async fn scopes_are_tracked_independently() {
        let limiter = limiter_with(RateQuota::per_minute(1));
        assert!(limiter.is_allowed("test", "alice").await);
        // Unknown scope falls back to the default quota, under its own key.
        assert!(limiter.is_allowed("other", "alice").await);
    }

    #[tokio::test]
    async fn window_expiry_resets_the_count() {
        let limiter = limiter_with(RateQuota {
            max_requests: 1,
            window: Duration::from_millis(0),
        });
        assert!(limiter.is_allowed("test", "alice").await);
        assert!(limiter.is_allowed("test", "alice").await);
    }
}
