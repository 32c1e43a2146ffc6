//! Fixed-window rate limiting.
//!
//! Each key owns a counter and a reset deadline. The first hit opens a
//! window of `window_secs`; hits inside the window increment the counter;
//! the first hit after the deadline starts a fresh window at one. A client
//! can therefore land `max_requests` hits at the end of one window and
//! `max_requests` more at the start of the next.
//!
//! Counters live behind [`RateLimitStore`]: [`MemoryRateLimitStore`] for a
//! single process, [`RedisRateLimitStore`] when several instances share
//! limits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use neighborly_common::{AppError, AppResult, SharedClock};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Limit for one kind of request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Namespace of the counter key.
    pub name: &'static str,
    pub max_requests: u64,
    pub window_secs: u64,
    /// Message sent with the 429.
    pub message: &'static str,
}

impl RatePolicy {
    #[must_use]
    pub const fn new(
        name: &'static str,
        max_requests: u64,
        window_secs: u64,
        message: &'static str,
    ) -> Self {
        Self {
            name,
            max_requests,
            window_secs,
            message,
        }
    }
}

/// Limits used by the public API.
pub mod policies {
    use super::RatePolicy;

    const HOUR: u64 = 60 * 60;
    const DAY: u64 = 24 * HOUR;

    /// Every API request, per client IP.
    pub const STANDARD: RatePolicy =
        RatePolicy::new("api", 300, 60, "Too many requests. Please try again later.");

    /// Rating submissions, per client IP.
    pub const RATINGS: RatePolicy = RatePolicy::new(
        "ratings",
        60,
        HOUR,
        "Too many ratings. Please try again later.",
    );

    /// Comment submissions, per client IP.
    pub const COMMENTS: RatePolicy = RatePolicy::new(
        "comments",
        5,
        HOUR,
        "Too many comments. Please try again later.",
    );

    /// Community suggestions, per submitter email.
    pub const SUGGESTIONS: RatePolicy = RatePolicy::new(
        "suggestions",
        3,
        DAY,
        "Rate limit exceeded. Maximum 3 suggestions per day.",
    );

    /// Suggestion votes, per client IP.
    pub const VOTES: RatePolicy = RatePolicy::new(
        "votes",
        30,
        HOUR,
        "Too many votes. Please try again later.",
    );
}

/// Counter state right after a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Hits in the current window, this one included.
    pub count: u64,
    /// Seconds until the window closes.
    pub reset_in_secs: u64,
}

/// Storage for per-key window counters.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record one hit on `key` and return the window state.
    async fn hit(&self, key: &str, window_secs: u64) -> AppResult<WindowCount>;
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u64,
    reset_at: DateTime<Utc>,
}

/// Process-local counters.
///
/// Not shared between server instances.
#[derive(Clone)]
pub struct MemoryRateLimitStore {
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
    clock: SharedClock,
}

impl MemoryRateLimitStore {
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Drop windows that have already closed.
    pub async fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, state| state.reset_at > now);
        before - windows.len()
    }

    /// Number of tracked keys.
    pub async fn key_count(&self) -> usize {
        self.windows.read().await.len()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(&self, key: &str, window_secs: u64) -> AppResult<WindowCount> {
        let now = self.clock.now();
        let window = Duration::seconds(window_secs as i64);
        let mut windows = self.windows.write().await;

        let state = windows.entry(key.to_string()).or_insert(WindowState {
            count: 0,
            reset_at: now + window,
        });

        if now >= state.reset_at {
            state.count = 0;
            state.reset_at = now + window;
        }

        state.count += 1;
        let reset_in_secs = (state.reset_at - now).num_seconds().max(0) as u64;

        Ok(WindowCount {
            count: state.count,
            reset_in_secs,
        })
    }
}

/// Counters in Redis: `INCR`, then `EXPIRE` on the first hit of a window.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisRateLimitStore {
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str, window_secs: u64) -> AppResult<WindowCount> {
        let key = format!("{}:ratelimit:{key}", self.prefix);

        let count: u64 = self
            .redis
            .incr(key.clone())
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        let ttl: i64 = self
            .redis
            .ttl(key.clone())
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        // A fresh key, or one whose earlier EXPIRE never landed, has no TTL.
        let reset_in_secs = match remaining_ttl(ttl) {
            Some(secs) => secs.max(1),
            None => {
                self.redis
                    .expire::<(), _>(key, window_secs as i64, None)
                    .await
                    .map_err(|e| AppError::Redis(e.to_string()))?;
                window_secs
            }
        };

        Ok(WindowCount {
            count,
            reset_in_secs,
        })
    }
}

/// Seconds left on a counter key, `None` when Redis reports no expiry
/// (`-1`) or no key (`-2`).
fn remaining_ttl(ttl: i64) -> Option<u64> {
    u64::try_from(ttl).ok()
}

/// Outcome of a limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_in_secs: u64,
}

/// Applies [`RatePolicy`] limits on top of a [`RateLimitStore`].
#[derive(Clone)]
pub struct FixedWindowLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// Limiter whose counters live in this process.
    #[must_use]
    pub fn in_memory(clock: SharedClock) -> Self {
        Self::new(Arc::new(MemoryRateLimitStore::new(clock)))
    }

    /// Record a hit for `key` under `policy`.
    pub async fn check(&self, key: &str, policy: &RatePolicy) -> AppResult<RateDecision> {
        let scoped = format!("{}:{key}", policy.name);
        let window = self.store.hit(&scoped, policy.window_secs).await?;
        let allowed = window.count <= policy.max_requests;

        if allowed {
            debug!(policy = policy.name, key = %key, count = window.count, "Rate limit check passed");
        } else {
            warn!(policy = policy.name, key = %key, count = window.count, limit = policy.max_requests, "Rate limit exceeded");
        }

        Ok(RateDecision {
            allowed,
            limit: policy.max_requests,
            remaining: policy.max_requests.saturating_sub(window.count),
            reset_in_secs: window.reset_in_secs,
        })
    }

    /// Like [`Self::check`] but fails with [`AppError::RateLimited`].
    pub async fn enforce(&self, key: &str, policy: &RatePolicy) -> AppResult<RateDecision> {
        let decision = self.check(key, policy).await?;
        if decision.allowed {
            Ok(decision)
        } else {
            Err(AppError::RateLimited(policy.message.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use neighborly_common::ManualClock;

    fn limiter() -> (FixedWindowLimiter, ManualClock) {
        let clock = ManualClock::default();
        let store = MemoryRateLimitStore::new(Arc::new(clock.clone()));
        (FixedWindowLimiter::new(Arc::new(store)), clock)
    }

    #[test]
    fn test_counter_without_expiry_gets_one() {
        assert_eq!(remaining_ttl(-1), None);
        assert_eq!(remaining_ttl(-2), None);
        assert_eq!(remaining_ttl(0), Some(0));
        assert_eq!(remaining_ttl(30), Some(30));
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_blocks() {
        let (limiter, _clock) = limiter();
        for i in 1..=5 {
            let d = limiter.check("10.0.0.1", &policies::COMMENTS).await.unwrap();
            assert!(d.allowed);
            assert_eq!(d.remaining, 5 - i);
        }
        let d = limiter.check("10.0.0.1", &policies::COMMENTS).await.unwrap();
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
    }

    #[tokio::test]
    async fn test_enforce_uses_policy_message() {
        let (limiter, _clock) = limiter();
        for _ in 0..3 {
            limiter.enforce("a@example.com", &policies::SUGGESTIONS).await.unwrap();
        }
        match limiter.enforce("a@example.com", &policies::SUGGESTIONS).await {
            Err(AppError::RateLimited(msg)) => {
                assert_eq!(msg, "Rate limit exceeded. Maximum 3 suggestions per day.");
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_keys_and_policies_are_independent() {
        let (limiter, _clock) = limiter();
        for _ in 0..5 {
            limiter.check("ip-a", &policies::COMMENTS).await.unwrap();
        }
        assert!(!limiter.check("ip-a", &policies::COMMENTS).await.unwrap().allowed);
        assert!(limiter.check("ip-b", &policies::COMMENTS).await.unwrap().allowed);
        assert!(limiter.check("ip-a", &policies::RATINGS).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let (limiter, clock) = limiter();
        for _ in 0..3 {
            limiter.check("e", &policies::SUGGESTIONS).await.unwrap();
        }
        assert!(!limiter.check("e", &policies::SUGGESTIONS).await.unwrap().allowed);

        clock.advance(Duration::hours(24));
        let d = limiter.check("e", &policies::SUGGESTIONS).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.remaining, 2);
    }

    #[tokio::test]
    async fn test_straddling_window_edge_allows_double_limit() {
        let (limiter, clock) = limiter();

        // Open the window, then wait until just before it closes.
        assert!(limiter.check("ip", &policies::COMMENTS).await.unwrap().allowed);
        clock.advance(Duration::minutes(59));
        for _ in 0..4 {
            assert!(limiter.check("ip", &policies::COMMENTS).await.unwrap().allowed);
        }

        // Two minutes later a new window has opened.
        clock.advance(Duration::minutes(2));
        for _ in 0..5 {
            assert!(limiter.check("ip", &policies::COMMENTS).await.unwrap().allowed);
        }
        // Ten accepted within about two minutes.
        assert!(!limiter.check("ip", &policies::COMMENTS).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_reset_countdown() {
        let (limiter, clock) = limiter();
        let first = limiter.check("ip", &policies::RATINGS).await.unwrap();
        assert_eq!(first.reset_in_secs, 3600);
        clock.advance(Duration::minutes(10));
        let later = limiter.check("ip", &policies::RATINGS).await.unwrap();
        assert_eq!(later.reset_in_secs, 3000);
    }

    #[tokio::test]
    async fn test_memory_cleanup() {
        let clock = ManualClock::default();
        let store = MemoryRateLimitStore::new(Arc::new(clock.clone()));
        store.hit("a", 60).await.unwrap();
        store.hit("b", 3600).await.unwrap();
        clock.advance(Duration::minutes(2));

        assert_eq!(store.cleanup().await, 1);
        assert_eq!(store.key_count().await, 1);
    }
}
