use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::warn;

use crate::models::{AiStatusReply, ChatMessage};
use crate::prompts::chat_prompt;
use crate::state::AppState;

// Sends a tiny uncached prompt through the worker so a live backend is actually hit
pub async fn ai_status_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<AiStatusReply>) {
    let prompt = chat_prompt(&[ChatMessage {
        role: "user".to_string(),
        content: "test".to_string(),
    }]);
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.generate_uncached(prompt).await {
        Ok(_) => (
            StatusCode::OK,
            Json(AiStatusReply {
                service: state.model.clone(),
                available: true,
                message: "Generation backend is working normally.".to_string(),
                error: None,
                timestamp,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "ai status check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AiStatusReply {
                    service: state.model.clone(),
                    available: false,
                    message: "Generation backend status check failed.".to_string(),
                    error: Some(e.to_string()),
                    timestamp,
                }),
            )
        }
    }
}
