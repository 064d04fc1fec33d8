use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::time::{Duration, interval};
use tracing::{info, warn};

use crate::models::BackendStatus;

// Health check path on generation backends
pub const HEALTH_PATH: &str = "/api/tags";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

// Single generation backend
pub struct Backend {
    pub url: String,
    healthy: AtomicBool,
}

impl Backend {
    pub fn new(url: String) -> Self {
        Self {
            url,
            healthy: AtomicBool::new(true),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }
}

// Round-robin pool over the configured backends
pub struct LoadBalancer {
    backends: Vec<Arc<Backend>>,
    current: AtomicUsize,
}

impl LoadBalancer {
    // `urls` come from GatewayConfig and are already normalised
    pub fn new(urls: Vec<String>) -> Self {
        let backends: Vec<Arc<Backend>> = urls
            .into_iter()
            .map(|url| Arc::new(Backend::new(url)))
            .collect();

        info!(count = backends.len(), "load balancer initialized");
        for (i, b) in backends.iter().enumerate() {
            info!("  [{}] {}", i + 1, b.url);
        }

        Self {
            backends,
            current: AtomicUsize::new(0),
        }
    }

    // Get next healthy backend (round-robin)
    pub fn get_backend(&self) -> Option<Arc<Backend>> {
        let len = self.backends.len();
        if len == 0 {
            return None;
        }
        let start = self.current.fetch_add(1, Ordering::Relaxed) % len;

        (0..len)
            .map(|i| &self.backends[(start + i) % len])
            .find(|backend| backend.is_healthy())
            .map(Arc::clone)
    }

    pub fn all_backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn statuses(&self) -> Vec<BackendStatus> {
        self.backends
            .iter()
            .map(|b| BackendStatus {
                url: b.url.clone(),
                healthy: b.is_healthy(),
            })
            .collect()
    }
}

// Polls every backend and flips its health flag
pub async fn health_checker(
    load_balancer: Arc<LoadBalancer>,
    client: reqwest::Client,
    check_interval: Duration,
) {
    let mut interval = interval(check_interval);

    info!(?check_interval, "health checker started");

    loop {
        interval.tick().await;

        for backend in load_balancer.all_backends() {
            let url = format!("{}{}", backend.url, HEALTH_PATH);
            let was_healthy = backend.is_healthy();

            let is_healthy = match client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
                Ok(res) => res.status().is_success(),
                Err(_) => false,
            };
            backend.set_healthy(is_healthy);

            if was_healthy != is_healthy {
                if is_healthy {
                    info!(backend = %backend.url, "backend is now healthy");
                } else {
                    warn!(backend = %backend.url, "backend is now unhealthy");
                }
            }
        }
    }
}
