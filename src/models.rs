use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::GatewayError;

// Generation backend request format
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub stream: bool,
}

// Generation backend response format
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenerateResponse {
    pub model: String,
    pub response: String,
}

// Queued generation job - request + one-time reply channel
pub struct GenerationJob {
    pub request: GenerateRequest,
    pub use_cache: bool, // false always reaches a backend
    pub response_tx: oneshot::Sender<Result<GenerateResponse, GatewayError>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    Blog,
    Marketing,
    #[default]
    General,
}

#[derive(Debug, Deserialize)]
pub struct TextGenRequest {
    pub prompt: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: TextKind,
}

#[derive(Debug, Serialize)]
pub struct TextGenReply {
    pub result: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    pub existing_todos: Option<Vec<String>>,
    #[serde(default)]
    pub user_context: String,
}

#[derive(Debug, Serialize)]
pub struct TodoReply {
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FileAnalysisReply {
    pub analysis: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub headers: Vec<String>,
    pub row_count: usize,
    pub has_headers: bool,
    pub columns: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvAnalysisReply {
    pub analysis: String,
    pub chart_data: ChartData,
}

#[derive(Debug, Serialize)]
pub struct AiStatusReply {
    pub service: String,
    pub available: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct BackendStatus {
    pub url: String,
    pub healthy: bool,
}
