use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

// Startup configuration errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate limit must be at least 1 request per window")]
    ZeroLimit,
    #[error("rate limit window must be longer than zero")]
    ZeroWindow,
    #[error("{0} must be greater than 0")]
    ZeroValue(&'static str),
    #[error("at least one backend is required")]
    NoBackends,
}

// Errors returned to HTTP clients
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Too many requests. Please try again later.")]
    RateLimited,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    UnsupportedFileType(String),
    #[error("no healthy backends available")]
    NoHealthyBackend,
    #[error("failed to queue request")]
    QueueClosed,
    #[error("worker failed to respond")]
    WorkerDropped,
    #[error("backend request failed: {0}")]
    Backend(#[from] reqwest::Error),
    #[error("backend returned status {0}")]
    BackendStatus(StatusCode),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            GatewayError::NoHealthyBackend
            | GatewayError::QueueClosed
            | GatewayError::WorkerDropped => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Backend(_) | GatewayError::BackendStatus(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, "request failed: {}", self);
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
