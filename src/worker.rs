use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::{ResponseCache, make_cache_key};
use crate::error::GatewayError;
use crate::load_balancer::LoadBalancer;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE};
use crate::models::{GenerateRequest, GenerateResponse, GenerationJob};

// Consumes queued generation jobs one at a time
pub async fn generation_worker(
    mut rx: mpsc::Receiver<GenerationJob>,
    client: reqwest::Client,
    load_balancer: Arc<LoadBalancer>,
    cache: Arc<ResponseCache>,
    timeout: Duration,
) {
    info!(?timeout, "generation worker started");

    while let Some(job) = rx.recv().await {
        let job_cache = job.use_cache.then_some(cache.as_ref());
        let result = generate(&client, &load_balancer, job_cache, &job.request, timeout).await;
        // caller may have gone away
        let _ = job.response_tx.send(result);
    }

    info!("generation queue closed, worker exiting");
}

// `cache: None` skips both lookup and store
async fn generate(
    client: &reqwest::Client,
    load_balancer: &LoadBalancer,
    cache: Option<&ResponseCache>,
    request: &GenerateRequest,
    timeout: Duration,
) -> Result<GenerateResponse, GatewayError> {
    let cache_key = make_cache_key(request);

    if let Some(cache) = cache {
        if let Some(response) = cache.get(&cache_key) {
            CACHE_HITS.inc();
            debug!("cache hit");
            return Ok(response);
        }
        CACHE_MISSES.inc();
    }

    let backend = load_balancer
        .get_backend()
        .ok_or(GatewayError::NoHealthyBackend)?;
    debug!(backend = %backend.url, "calling backend");

    let res = match client
        .post(format!("{}/api/generate", backend.url))
        .timeout(timeout)
        .json(request)
        .send()
        .await
    {
        Ok(res) => res,
        Err(e) => {
            backend.set_healthy(false);
            warn!(backend = %backend.url, error = %e, "backend failed, marked unhealthy");
            return Err(e.into());
        }
    };

    if !res.status().is_success() {
        return Err(GatewayError::BackendStatus(res.status()));
    }

    let body = res.json::<GenerateResponse>().await?;
    if let Some(cache) = cache {
        cache.insert(cache_key, body.clone());
        CACHE_SIZE.set(cache.len() as f64);
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;
    use tokio::sync::oneshot;

    use crate::test_backend::{StubReply, spawn_backend, unreachable_url};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "llama3".to_string(),
            prompt: prompt.to_string(),
            stream: false,
        }
    }

    fn setup(url: String) -> (reqwest::Client, LoadBalancer, ResponseCache) {
        (
            reqwest::Client::new(),
            LoadBalancer::new(vec![url]),
            ResponseCache::new(Duration::from_secs(30)),
        )
    }

    #[tokio::test]
    async fn cache_hit_skips_backend() {
        let backend = spawn_backend(StubReply::Echo).await;
        let (client, lb, cache) = setup(backend.url.clone());

        let first = generate(&client, &lb, Some(&cache), &request("hi"), TIMEOUT)
            .await
            .unwrap();
        let second = generate(&client, &lb, Some(&cache), &request("hi"), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(first.response, "echo: hi");
        assert_eq!(second.response, first.response);
        assert_eq!(backend.hits.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn uncached_calls_always_reach_backend() {
        let backend = spawn_backend(StubReply::Echo).await;
        let (client, lb, cache) = setup(backend.url.clone());

        // a cached answer must not short-circuit an uncached call
        generate(&client, &lb, Some(&cache), &request("hi"), TIMEOUT)
            .await
            .unwrap();
        for _ in 0..2 {
            generate(&client, &lb, None, &request("hi"), TIMEOUT)
                .await
                .unwrap();
        }

        assert_eq!(backend.hits.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn error_status_maps_to_bad_gateway_and_is_not_cached() {
        let backend = spawn_backend(StubReply::Status(StatusCode::INTERNAL_SERVER_ERROR)).await;
        let (client, lb, cache) = setup(backend.url.clone());

        let err = generate(&client, &lb, Some(&cache), &request("hi"), TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::BackendStatus(StatusCode::INTERNAL_SERVER_ERROR)
        ));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(cache.is_empty());
        // a reachable backend stays in rotation
        assert!(lb.get_backend().is_some());
    }

    #[tokio::test]
    async fn unreachable_backend_is_marked_unhealthy() {
        let (client, lb, cache) = setup(unreachable_url().await);

        let err = generate(&client, &lb, Some(&cache), &request("hi"), TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Backend(_)));
        assert!(lb.get_backend().is_none());

        let err = generate(&client, &lb, Some(&cache), &request("hi"), TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NoHealthyBackend));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let backend = spawn_backend(StubReply::Delay(Duration::from_secs(5))).await;
        let (client, lb, cache) = setup(backend.url.clone());

        let err = generate(
            &client,
            &lb,
            Some(&cache),
            &request("hi"),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();

        match err {
            GatewayError::Backend(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn worker_answers_queued_jobs() {
        let backend = spawn_backend(StubReply::Echo).await;
        let (client, lb, cache) = setup(backend.url.clone());
        let (jobs, rx) = mpsc::channel(4);
        tokio::spawn(generation_worker(
            rx,
            client,
            Arc::new(lb),
            Arc::new(cache),
            TIMEOUT,
        ));

        for use_cache in [true, true, false] {
            let (response_tx, response_rx) = oneshot::channel();
            jobs.send(GenerationJob {
                request: request("queued"),
                use_cache,
                response_tx,
            })
            .await
            .unwrap();
            assert_eq!(response_rx.await.unwrap().unwrap().response, "echo: queued");
        }

        assert_eq!(backend.hits.load(Ordering::SeqCst), 2);
    }
}
