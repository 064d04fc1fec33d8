pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod load_balancer;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod prompts;
pub mod rate_limit;
pub mod state;
pub mod sweeper;
pub mod validation;
pub mod worker;

#[cfg(test)]
mod test_backend;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;

use crate::handlers::{
    UPLOAD_BODY_LIMIT, ai_status_handler, chat_handler, csv_analyze_handler,
    file_analyze_handler, health_handler, metrics_handler, text_gen_handler, todos_handler,
};
use crate::middleware::{QuotaGuard, enforce_quota};
use crate::state::AppState;

// Build the router. Each route group gets its own quota; `/health` and `/metrics` are unlimited.
pub fn app(state: Arc<AppState>) -> Router {
    let generation = QuotaGuard::new(Arc::clone(&state.limiter), state.generation_quota);
    let files = QuotaGuard::new(Arc::clone(&state.limiter), state.file_quota);

    let ai_routes: Router<Arc<AppState>> = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/text-gen", post(text_gen_handler))
        .route("/api/todos", post(todos_handler))
        .route("/api/ai-status", get(ai_status_handler))
        .route_layer(from_fn_with_state(generation, enforce_quota));

    let file_routes: Router<Arc<AppState>> = Router::new()
        .route("/api/file-analyze", post(file_analyze_handler))
        .route("/api/csv-analyze", post(csv_analyze_handler))
        .route_layer(from_fn_with_state(files, enforce_quota))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(ai_routes)
        .merge(file_routes)
        .with_state(state)
}
