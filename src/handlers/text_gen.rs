use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;

use super::bad_json;
use crate::error::GatewayError;
use crate::models::{TextGenReply, TextGenRequest};
use crate::prompts::text_prompt;
use crate::state::AppState;
use crate::validation::validate_text_length;

pub async fn text_gen_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TextGenRequest>, JsonRejection>,
) -> Result<Json<TextGenReply>, GatewayError> {
    let Json(payload) = payload.map_err(bad_json)?;

    let prompt = payload
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| GatewayError::BadRequest("prompt is required".into()))?;

    if !validate_text_length(&prompt, state.max_text_length) {
        return Err(GatewayError::BadRequest(format!(
            "prompt must be at most {} characters",
            state.max_text_length
        )));
    }

    let result = state.generate(text_prompt(&prompt, payload.kind)).await?;
    Ok(Json(TextGenReply { result }))
}
