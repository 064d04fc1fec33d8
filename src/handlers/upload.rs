use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;

use crate::error::GatewayError;
use crate::validation::{DEFAULT_MAX_FILE_MB, sanitize_text, validate_file_type};

// Largest accepted upload plus room for multipart framing
pub const UPLOAD_BODY_LIMIT: usize = DEFAULT_MAX_FILE_MB as usize * 1024 * 1024 + 64 * 1024;

// The `file` field of a multipart form
pub struct UploadedFile {
    pub name: String, // HTML-escaped, it ends up in prompts
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    // Accepted when either the declared type or the extension matches
    pub fn is_one_of(&self, content_types: &[&str], extensions: &[&str]) -> bool {
        content_types.contains(&self.content_type.as_str())
            || validate_file_type(&self.name, extensions)
    }
}

fn multipart_error(e: MultipartError) -> GatewayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge("Uploaded file is too large.".into())
    } else {
        GatewayError::BadRequest(format!("Invalid upload: {}", e.body_text()))
    }
}

pub async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, GatewayError> {
    let mut multipart = multipart
        .map_err(|e| GatewayError::BadRequest(format!("Invalid upload: {}", e.body_text())))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let name = sanitize_text(field.file_name().unwrap_or_default());
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(UploadedFile {
            name,
            content_type,
            bytes,
        });
    }

    Err(GatewayError::BadRequest("No file was uploaded.".into()))
}
