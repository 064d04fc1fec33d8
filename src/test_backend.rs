// In-process stand-in for an Ollama-style generation backend

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::models::{GenerateRequest, GenerateResponse};

#[derive(Clone, Copy)]
pub(crate) enum StubReply {
    Echo,
    Status(StatusCode),
    Delay(Duration),
}

pub(crate) struct StubBackend {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct StubState {
    reply: StubReply,
    hits: Arc<AtomicUsize>,
}

async fn generate(State(stub): State<StubState>, Json(req): Json<GenerateRequest>) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);

    match stub.reply {
        StubReply::Status(status) => return status.into_response(),
        StubReply::Delay(delay) => tokio::time::sleep(delay).await,
        StubReply::Echo => {}
    }

    Json(GenerateResponse {
        model: req.model,
        response: format!("echo: {}", req.prompt),
    })
    .into_response()
}

pub(crate) async fn spawn_backend(reply: StubReply) -> StubBackend {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/generate", post(generate))
        .route("/api/tags", get(|| async { "{}" }))
        .with_state(StubState {
            reply,
            hits: Arc::clone(&hits),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubBackend {
        url: format!("http://{}", addr),
        hits,
    }
}

// Address that refuses connections
pub(crate) async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
