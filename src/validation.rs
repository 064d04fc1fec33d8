// Input validation helpers shared by the handlers

pub const DEFAULT_MAX_FILE_MB: u64 = 10;
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 10_000;

// Escape HTML-significant characters, then trim
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out.trim().to_string()
}

pub fn validate_file_size(size: u64, max_size_mb: u64) -> bool {
    size <= max_size_mb.saturating_mul(1024 * 1024)
}

// `allowed` holds extensions with a leading dot, e.g. ".pdf"
pub fn validate_file_type(filename: &str, allowed: &[&str]) -> bool {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return false;
    };
    let dotted = format!(".{}", extension);
    allowed.iter().any(|ext| ext.eq_ignore_ascii_case(&dotted))
}

pub fn validate_text_length(text: &str, max_length: usize) -> bool {
    text.chars().count() <= max_length
}
