//! HTTP utilities
//!
//! The shared request timeout and a plain text-fetch helper for recipe
//! scripts that read remote metadata (version files, release notes).

use crate::error::ToolError;
use std::sync::OnceLock;
use std::time::Duration;

/// Default HTTP timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Get HTTP timeout from environment variable or use default.
/// Cached for performance (only reads env var once).
pub(crate) fn get_http_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let secs = std::env::var("RTOOL_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        // Clamp to reasonable range (5-300 seconds)
        Duration::from_secs(secs.clamp(5, 300))
    })
}

/// Fetch content from a URL (GET request)
pub fn http_get(url: &str) -> Result<String, ToolError> {
    ureq::get(url)
        .timeout(get_http_timeout())
        .call()
        .map_err(|e| ToolError::Network {
            url: url.to_string(),
            attempts: 1,
            source: Box::new(e),
        })?
        .into_string()
        .map_err(|e| ToolError::io("failed to read response body", e))
}
