use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;

use super::bad_json;
use crate::error::GatewayError;
use crate::models::{TodoReply, TodoRequest};
use crate::prompts::{parse_recommendations, todo_prompt};
use crate::state::AppState;

pub async fn todos_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Json<TodoReply>, GatewayError> {
    let Json(payload) = payload.map_err(bad_json)?;

    let existing = payload
        .existing_todos
        .ok_or_else(|| GatewayError::BadRequest("existingTodos must be an array".into()))?;

    let text = state
        .generate(todo_prompt(&existing, &payload.user_context))
        .await?;

    Ok(Json(TodoReply {
        recommendations: parse_recommendations(&text),
    }))
}
