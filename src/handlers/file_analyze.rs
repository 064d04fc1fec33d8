use axum::extract::{Multipart, State, multipart::MultipartRejection};
use axum::Json;
use std::sync::Arc;

use super::upload::{UploadedFile, read_file_field};
use crate::error::GatewayError;
use crate::models::FileAnalysisReply;
use crate::prompts::file_analysis_prompt;
use crate::state::AppState;
use crate::validation::{DEFAULT_MAX_FILE_MB, validate_file_size, validate_file_type};

const SUPPORTED_TYPES: &[&str] = &[
    "application/pdf",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];
const SUPPORTED_EXTENSIONS: &[&str] = &[".pdf", ".txt", ".doc", ".docx"];

// PDFs are not parsed; only the head is read as text
const PDF_HEAD_BYTES: usize = 1000;
const PDF_MIN_CHARS: usize = 10;

pub async fn file_analyze_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FileAnalysisReply>, GatewayError> {
    let file = read_file_field(multipart).await?;

    if !validate_file_size(file.bytes.len() as u64, DEFAULT_MAX_FILE_MB) {
        return Err(GatewayError::PayloadTooLarge(format!(
            "File must be {} MB or smaller.",
            DEFAULT_MAX_FILE_MB
        )));
    }

    if !file.is_one_of(SUPPORTED_TYPES, SUPPORTED_EXTENSIONS) {
        return Err(GatewayError::UnsupportedFileType(
            "Unsupported file type. Only PDF, TXT, DOC and DOCX files are accepted.".into(),
        ));
    }

    let content = extract_text(&file)?;
    if content.trim().is_empty() {
        return Err(GatewayError::BadRequest(
            "Could not extract any text from the file.".into(),
        ));
    }

    let analysis = state
        .generate(file_analysis_prompt(&file.name, &content))
        .await?;
    Ok(Json(FileAnalysisReply { analysis }))
}

fn extract_text(file: &UploadedFile) -> Result<String, GatewayError> {
    let is_pdf =
        file.content_type == "application/pdf" || validate_file_type(&file.name, &[".pdf"]);
    if !is_pdf {
        return Ok(String::from_utf8_lossy(&file.bytes).into_owned());
    }

    let head = &file.bytes[..file.bytes.len().min(PDF_HEAD_BYTES)];
    let text = String::from_utf8_lossy(head).into_owned();
    if text.chars().count() > PDF_MIN_CHARS {
        Ok(text)
    } else {
        Err(GatewayError::BadRequest("Could not read the PDF file.".into()))
    }
}
