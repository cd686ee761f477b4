//! Fixed-window rate limiting keyed by caller and endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde::Serialize;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::client_ip;

/// Message returned with `429 Too Many Requests`.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";

/// Source of the current time in milliseconds since the UNIX epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Request count for one key within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitBucket {
    /// Requests observed in the window, always >= 1.
    pub count: u32,
    /// When the window ends (ms since epoch).
    pub reset_at: u64,
}

/// Keyed counter storage.
///
/// The in-process [`MemoryStore`] suits a single instance. A shared
/// backend (e.g. a distributed cache) can implement this trait to make the
/// limit global across instances.
pub trait RateLimitStore: Send + Sync {
    /// Current bucket for `key`, if any.
    fn get(&self, key: &str) -> Option<RateLimitBucket>;

    /// Increment an existing bucket. `None` if `key` has no bucket.
    fn increment(&self, key: &str) -> Option<RateLimitBucket>;

    /// Replace the bucket for `key` with a fresh one (`count = 1`).
    fn reset(&self, key: &str, reset_at: u64) -> RateLimitBucket;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store. Stale buckets are replaced on next access for the
/// same key and never swept.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: DashMap<String, RateLimitBucket>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryStore {
    fn get(&self, key: &str) -> Option<RateLimitBucket> {
        self.buckets.get(key).map(|b| *b)
    }

    fn increment(&self, key: &str) -> Option<RateLimitBucket> {
        self.buckets.get_mut(key).map(|mut b| {
            b.count = b.count.saturating_add(1);
            *b
        })
    }

    fn reset(&self, key: &str, reset_at: u64) -> RateLimitBucket {
        let bucket = RateLimitBucket { count: 1, reset_at };
        self.buckets.insert(key.to_string(), bucket);
        bucket
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }
}

/// Limit and window for one rate-limited endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOptions {
    pub limit: u32,
    pub window_ms: u64,
}

/// Outcome of one [`RateLimiter::rate_limit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    pub success: bool,
    pub limit: u32,
    pub remaining: u32,
    /// End of the current window (ms since epoch).
    pub reset: u64,
}

/// Fixed-window counter limiter.
///
/// The get/increment/reset sequence is not atomic as a whole, so concurrent
/// requests for one key may slightly overshoot the limit.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Count one request for `key` and decide whether it is allowed.
    pub fn rate_limit(&self, key: &str, options: RateLimitOptions) -> RateLimitResult {
        let now = self.clock.now_ms();
        let fresh = || self.store.reset(key, now.saturating_add(options.window_ms));

        let bucket = match self.store.get(key) {
            Some(existing) if now < existing.reset_at => {
                self.store.increment(key).unwrap_or_else(fresh)
            }
            _ => fresh(),
        };

        RateLimitResult {
            success: bucket.count <= options.limit,
            limit: options.limit,
            remaining: options.limit.saturating_sub(bucket.count),
            reset: bucket.reset_at,
        }
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.store.len()
    }
}

/// Middleware limiting contact submissions per client IP.
pub async fn contact_rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let live = state.live.load_full();
    let options = RateLimitOptions {
        limit: live.config.contact.limit,
        window_ms: live.config.contact.window_ms,
    };

    let ip = client_ip(request.headers());
    let key = format!("contact:{}", ip);
    let result = state.limiter.rate_limit(&key, options);

    if result.success {
        tracing::debug!(client = %ip, remaining = result.remaining, "Contact rate limit check passed");
        next.run(request).await
    } else {
        tracing::warn!(client = %ip, limit = result.limit, reset = result.reset, "Rate limit exceeded");
        metrics::record_rate_limited("contact");
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({ "error": RATE_LIMITED_MESSAGE })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTS: RateLimitOptions = RateLimitOptions {
        limit: 5,
        window_ms: 60_000,
    };

    fn limiter(start: u64) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        (RateLimiter::new(Arc::new(MemoryStore::new()), clock.clone()), clock)
    }

    #[test]
    fn test_limit_then_reject() {
        let (limiter, _) = limiter(1_000);

        let remaining: Vec<u32> = (0..5)
            .map(|_| {
                let r = limiter.rate_limit("contact:1.2.3.4", OPTS);
                assert!(r.success);
                assert_eq!(r.limit, 5);
                r.remaining
            })
            .collect();
        assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

        let sixth = limiter.rate_limit("contact:1.2.3.4", OPTS);
        assert!(!sixth.success);
        assert_eq!(sixth.remaining, 0);
    }

    #[test]
    fn test_reset_is_window_end() {
        let (limiter, clock) = limiter(1_000);
        let first = limiter.rate_limit("k", OPTS);
        assert_eq!(first.reset, 61_000);

        clock.advance(30_000);
        let second = limiter.rate_limit("k", OPTS);
        assert_eq!(second.reset, 61_000);
    }

    #[test]
    fn test_window_expiry_starts_fresh() {
        let (limiter, clock) = limiter(0);
        for _ in 0..6 {
            limiter.rate_limit("k", OPTS);
        }
        assert!(!limiter.rate_limit("k", OPTS).success);

        clock.advance(60_000);
        let after = limiter.rate_limit("k", OPTS);
        assert!(after.success);
        assert_eq!(after.remaining, 4);
        assert_eq!(after.reset, 120_000);
    }

    #[test]
    fn test_one_ms_before_reset_still_counts() {
        let (limiter, clock) = limiter(0);
        for _ in 0..5 {
            limiter.rate_limit("k", OPTS);
        }
        clock.advance(59_999);
        assert!(!limiter.rate_limit("k", OPTS).success);
    }

    #[test]
    fn test_keys_are_independent() {
        let (limiter, _) = limiter(0);
        for _ in 0..5 {
            limiter.rate_limit("contact:a", OPTS);
        }
        assert!(!limiter.rate_limit("contact:a", OPTS).success);
        assert!(limiter.rate_limit("contact:b", OPTS).success);
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_stale_bucket_replaced_not_evicted() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RateLimiter::new(store.clone(), clock.clone());

        limiter.rate_limit("a", OPTS);
        limiter.rate_limit("b", OPTS);
        clock.advance(120_000);
        limiter.rate_limit("a", OPTS);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap(), RateLimitBucket { count: 1, reset_at: 180_000 });
        assert_eq!(store.get("b").unwrap(), RateLimitBucket { count: 1, reset_at: 60_000 });
    }

    #[test]
    fn test_store_increment_requires_bucket() {
        let store = MemoryStore::new();
        assert!(store.increment("missing").is_none());
        assert!(store.is_empty());
        store.reset("k", 10);
        assert_eq!(store.increment("k").unwrap().count, 2);
    }
}
