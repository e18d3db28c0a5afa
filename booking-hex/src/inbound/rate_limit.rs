//! Rate limiting middleware using Governor.
//!
//! Each caller gets its own token bucket. Callers with a verified token are
//! keyed on the identity inside it; everyone else is keyed on the peer
//! address, so presenting a fresh bogus token does not buy a fresh bucket.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;
use std::{
    net::SocketAddr,
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use super::auth::AuthState;

pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 100;

/// Idle buckets are dropped every this many checks.
const SWEEP_EVERY: u64 = 1024;

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    checks: AtomicU64,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

impl RateLimiterState {
    /// Allows `requests_per_minute` requests per caller, all available as a burst.
    /// Zero is treated as one.
    pub fn new(requests_per_minute: u32) -> Self {
        let burst = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(burst)),
            checks: AtomicU64::new(0),
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep();
        }
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    /// Forgets callers whose bucket has refilled completely.
    pub fn sweep(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of callers currently holding a bucket.
    pub fn tracked_callers(&self) -> usize {
        self.limiter.len()
    }
}

/// Bucket key: the verified identity, else the peer address, else a shared
/// bucket.
fn caller_key(auth: &AuthState, request: &Request<Body>) -> String {
    if let Some(identity) = auth.caller_identity(request.headers()) {
        return identity;
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("peer:{}", addr.ip()))
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Rate limiting middleware. `/health` is never limited.
pub async fn rate_limit_middleware(
    State((limiter, auth)): State<(Arc<RateLimiterState>, Arc<AuthState>)>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = caller_key(&auth, &request);

    if !limiter.check(&key) {
        tracing::warn!(path = %request.uri().path(), "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "success": false,
                "message": "Rate limit exceeded. Please try again later.",
                "retry_after_seconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}
