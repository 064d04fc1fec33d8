// axum glue between routes and the rate limiter

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::error::GatewayError;
use crate::identity::resolve_client_identity;
use crate::metrics::{RATE_LIMIT_ENTRIES, RATE_LIMITED_TOTAL};
use crate::rate_limit::{Admission, Quota, RateLimitInfo, RateLimiter};

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

// A limiter plus the quota one route group is held to
#[derive(Clone)]
pub struct QuotaGuard {
    pub limiter: Arc<RateLimiter>,
    pub quota: Quota,
}

impl QuotaGuard {
    pub fn new(limiter: Arc<RateLimiter>, quota: Quota) -> Self {
        Self { limiter, quota }
    }
}

// Counts the request against (client, path) and answers 429 once the quota is spent.
// Mounted with from_fn_with_state as a route_layer.
pub async fn enforce_quota(
    State(guard): State<QuotaGuard>,
    request: Request,
    next: Next,
) -> Response {
    let identity = resolve_client_identity(request.headers());
    let route = request.uri().path().to_string();
    let (limit, window) = (guard.quota.limit(), guard.quota.window());
    let now = Instant::now();

    let Admission { admitted, info } = guard
        .limiter
        .consume_at(&identity, &route, limit, window, now);
    RATE_LIMIT_ENTRIES.set(guard.limiter.len() as f64);

    if !admitted {
        RATE_LIMITED_TOTAL.inc();
        warn!(%identity, %route, limit, "rate limit exceeded");

        let mut response = GatewayError::RateLimited.into_response();
        apply_quota_headers(response.headers_mut(), limit, &info, now);
        response.headers_mut().insert(
            RETRY_AFTER,
            HeaderValue::from(retry_after_secs(&info, now)),
        );
        return response;
    }

    let mut response = next.run(request).await;
    apply_quota_headers(response.headers_mut(), limit, &info, now);
    response
}

fn apply_quota_headers(headers: &mut HeaderMap, limit: u32, info: &RateLimitInfo, now: Instant) {
    let reset_unix = chrono::Utc::now().timestamp() + retry_after_secs(info, now) as i64;

    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(info.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_unix));
}

// Whole seconds until the window ends, rounded up, at least 1
fn retry_after_secs(info: &RateLimitInfo, now: Instant) -> u64 {
    let left = info.reset_at.saturating_duration_since(now);
    let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn retry_after_rounds_up() {
        let now = Instant::now();
        let info = |left: Duration| RateLimitInfo {
            remaining: 0,
            reset_at: now + left,
        };

        assert_eq!(retry_after_secs(&info(Duration::from_millis(1500)), now), 2);
        assert_eq!(retry_after_secs(&info(Duration::from_secs(60)), now), 60);
        assert_eq!(retry_after_secs(&info(Duration::ZERO), now), 1);
    }

    #[test]
    fn quota_headers_are_set() {
        let now = Instant::now();
        let info = RateLimitInfo {
            remaining: 3,
            reset_at: now + Duration::from_secs(30),
        };
        let mut headers = HeaderMap::new();
        apply_quota_headers(&mut headers, 5, &info, now);

        assert_eq!(headers[X_RATELIMIT_LIMIT], "5");
        assert_eq!(headers[X_RATELIMIT_REMAINING], "3");
        let reset: i64 = headers[X_RATELIMIT_RESET].to_str().unwrap().parse().unwrap();
        assert!(reset >= chrono::Utc::now().timestamp() + 29);
    }
}
