//! HTTP request handlers.

pub(crate) mod outline;

/// Convert internal path (without leading slash) to URL path (with leading slash).
pub(crate) fn to_url_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}")
    }
}
