use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

use crate::cache::ResponseCache;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::load_balancer::LoadBalancer;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{GenerateRequest, GenerationJob};
use crate::rate_limit::{Quota, RateLimiter};

// app's shared state
pub struct AppState {
    pub model: String,
    pub max_text_length: usize,
    pub load_balancer: Arc<LoadBalancer>,
    pub cache: Arc<ResponseCache>,
    pub limiter: Arc<RateLimiter>,
    pub generation_quota: Quota, // chat, text, todos, status
    pub file_quota: Quota,       // file and csv analysis
    pub jobs: mpsc::Sender<GenerationJob>,
}

impl AppState {
    // Returns the job receiver for the generation worker
    pub fn new(config: &GatewayConfig) -> (Self, mpsc::Receiver<GenerationJob>) {
        let (jobs, rx) = mpsc::channel(config.queue_capacity);

        let state = Self {
            model: config.model.clone(),
            max_text_length: config.max_text_length,
            load_balancer: Arc::new(LoadBalancer::new(config.backends.clone())),
            cache: Arc::new(ResponseCache::new(config.cache_ttl)),
            limiter: Arc::new(RateLimiter::new(config.rate_max_entries)),
            generation_quota: config.generation_quota,
            file_quota: config.file_quota,
            jobs,
        };

        (state, rx)
    }

    // Queue a prompt for the worker and wait for the generated text
    pub async fn generate(&self, prompt: String) -> Result<String, GatewayError> {
        self.submit(prompt, true).await
    }

    // Same as generate, but never answered from the response cache
    pub async fn generate_uncached(&self, prompt: String) -> Result<String, GatewayError> {
        self.submit(prompt, false).await
    }

    async fn submit(&self, prompt: String, use_cache: bool) -> Result<String, GatewayError> {
        REQUEST_TOTAL.inc();
        let start_time = Instant::now();

        let (response_tx, response_rx) = oneshot::channel();
        let job = GenerationJob {
            request: GenerateRequest {
                model: self.model.clone(),
                prompt,
                stream: false,
            },
            use_cache,
            response_tx,
        };

        self.jobs
            .send(job)
            .await
            .map_err(|_| GatewayError::QueueClosed)?;

        let result = response_rx
            .await
            .map_err(|_| GatewayError::WorkerDropped)?;

        REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

        result.map(|body| body.response)
    }
}
