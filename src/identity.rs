use axum::http::HeaderMap;
use tracing::debug;

// Set by Cloudflare in front of the gateway
pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";
pub const X_REAL_IP: &str = "x-real-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

// Used when no proxy header is present (local runs)
pub const FALLBACK_IDENTITY: &str = "127.0.0.1";

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn first_forwarded(headers: &HeaderMap) -> Option<&str> {
    header_value(headers, X_FORWARDED_FOR)
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

// Best-effort client address, never empty.
// cf-connecting-ip, then x-real-ip, then the first x-forwarded-for hop
pub fn resolve_client_identity(headers: &HeaderMap) -> String {
    let identity = header_value(headers, CF_CONNECTING_IP)
        .or_else(|| header_value(headers, X_REAL_IP))
        .or_else(|| first_forwarded(headers))
        .unwrap_or(FALLBACK_IDENTITY);

    debug!(
        cf_connecting_ip = ?headers.get(CF_CONNECTING_IP),
        real_ip = ?headers.get(X_REAL_IP),
        forwarded = ?headers.get(X_FORWARDED_FOR),
        identity,
        "resolved client identity"
    );

    identity.to_string()
}
