use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::metrics::{CACHE_SIZE, RATE_LIMIT_ENTRIES};
use crate::rate_limit::RateLimiter;

// Periodically drops expired rate limit windows and cached responses
pub async fn expiry_sweeper(limiter: Arc<RateLimiter>, cache: Arc<ResponseCache>, period: Duration) {
    let mut interval = interval(period);

    info!(?period, "expiry sweeper started");

    loop {
        interval.tick().await;

        let windows = limiter.sweep_expired();
        let responses = cache.prune_expired();

        RATE_LIMIT_ENTRIES.set(limiter.len() as f64);
        CACHE_SIZE.set(cache.len() as f64);

        if windows > 0 || responses > 0 {
            debug!(windows, responses, "swept expired entries");
        }
    }
}
