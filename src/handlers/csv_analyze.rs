use axum::extract::{Multipart, State, multipart::MultipartRejection};
use axum::Json;
use std::sync::Arc;

use super::upload::read_file_field;
use crate::error::GatewayError;
use crate::models::{ChartData, CsvAnalysisReply};
use crate::prompts::csv_analysis_prompt;
use crate::state::AppState;
use crate::validation::validate_file_size;

pub const MAX_CSV_MB: u64 = 5;

const CSV_TYPES: &[&str] = &["text/csv"];
const CSV_EXTENSIONS: &[&str] = &[".csv"];

pub async fn csv_analyze_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CsvAnalysisReply>, GatewayError> {
    let file = read_file_field(multipart).await?;

    if !validate_file_size(file.bytes.len() as u64, MAX_CSV_MB) {
        return Err(GatewayError::PayloadTooLarge(format!(
            "File must be {} MB or smaller.",
            MAX_CSV_MB
        )));
    }

    if !file.is_one_of(CSV_TYPES, CSV_EXTENSIONS) {
        return Err(GatewayError::UnsupportedFileType(
            "Only CSV files are accepted.".into(),
        ));
    }

    let content = String::from_utf8_lossy(&file.bytes).into_owned();
    if content.trim().is_empty() {
        return Err(GatewayError::BadRequest("The file is empty.".into()));
    }

    let analysis = state
        .generate(csv_analysis_prompt(&file.name, &content))
        .await?;

    Ok(Json(CsvAnalysisReply {
        analysis,
        chart_data: chart_data(&content),
    }))
}

// Shape of the table: first non-blank line is the header row
pub fn chart_data(csv: &str) -> ChartData {
    let lines: Vec<&str> = csv.lines().filter(|line| !line.trim().is_empty()).collect();
    let headers: Vec<String> = lines
        .first()
        .map(|row| row.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_default();

    ChartData {
        columns: headers.len(),
        headers,
        row_count: lines.len().saturating_sub(1),
        has_headers: true,
    }
}
