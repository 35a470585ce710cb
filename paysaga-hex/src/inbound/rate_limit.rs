//! Rate limiting middleware using Governor.
//!
//! Implements per-caller rate limiting with a token bucket algorithm.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde_json::json;
use std::{num::NonZeroU32, sync::Arc, time::Duration};

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Per-key rate limiters
    limiters: DashMap<String, Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    /// Quota for new keys
    quota: Quota,
    period: Duration,
    message: String,
}

impl RateLimiterState {
    /// Allows `requests` per `period` for each caller.
    ///
    /// Zero values are raised to the smallest valid quota.
    pub fn new(requests: u32, period: Duration, message: impl Into<String>) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let period = period.max(Duration::from_millis(1));
        let quota = Quota::with_period(period / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiters: DashMap::new(),
            quota,
            period,
            message: message.into(),
        }
    }

    /// Limit for payment operations: `per_minute` requests per caller.
    pub fn payments(per_minute: u32) -> Self {
        Self::new(
            per_minute,
            Duration::from_secs(60),
            "Too many payment requests, please try again later.",
        )
    }

    /// Limit for webhook deliveries: `per_second` requests per source.
    pub fn webhooks(per_second: u32) -> Self {
        Self::new(
            per_second,
            Duration::from_secs(1),
            "Too many webhook requests, please try again later.",
        )
    }

    /// Checks if a request should be rate limited.
    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let limiter = self
            .limiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)));

        limiter.check().is_ok()
    }
}

/// Caller identity: the presented API key, else the forwarding client address.
fn caller_key(request: &Request<Body>) -> String {
    let headers = request.headers();
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Rate limiting middleware, applied per route group.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = caller_key(&request);

    if !limiter.check(&key) {
        tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": limiter.message,
                "retry_after_seconds": limiter.period.as_secs().max(1)
            })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_enforced_per_key() {
        let limiter = RateLimiterState::payments(2);

        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }

    #[test]
    fn test_zero_quota_is_raised_to_one() {
        let limiter = RateLimiterState::webhooks(0);

        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
    }
}
