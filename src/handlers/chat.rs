use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;

use super::bad_json;
use crate::error::GatewayError;
use crate::models::{ChatReply, ChatRequest};
use crate::prompts::chat_prompt;
use crate::state::AppState;

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, GatewayError> {
    let Json(payload) = payload.map_err(bad_json)?;

    let messages = match payload.messages {
        Some(messages) if !messages.is_empty() => messages,
        _ => return Err(GatewayError::BadRequest("messages must be a non-empty array".into())),
    };

    let message = state.generate(chat_prompt(&messages)).await?;
    Ok(Json(ChatReply { message }))
}
