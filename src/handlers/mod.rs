mod ai_status;
mod chat;
mod csv_analyze;
mod file_analyze;
mod health;
mod metrics;
mod text_gen;
mod todos;
mod upload;

pub use ai_status::ai_status_handler;
pub use chat::chat_handler;
pub use csv_analyze::csv_analyze_handler;
pub use file_analyze::file_analyze_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use text_gen::text_gen_handler;
pub use todos::todos_handler;
pub use upload::UPLOAD_BODY_LIMIT;

use axum::extract::rejection::JsonRejection;

use crate::error::GatewayError;

// Malformed JSON bodies answer 400 with the usual error shape
pub(crate) fn bad_json(rejection: JsonRejection) -> GatewayError {
    GatewayError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
}
