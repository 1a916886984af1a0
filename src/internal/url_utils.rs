//! URL parsing utilities
//!
//! Helpers for deriving a local filename from a download URL.

/// Extract filename from a URL.
///
/// Handles query strings and fragments, returns "download" as fallback.
///
/// # Example
/// ```ignore
/// assert_eq!(extract_filename("https://example.com/foo-1.0.tar.gz"), "foo-1.0.tar.gz");
/// assert_eq!(extract_filename("https://example.com/file?v=1"), "file");
/// ```
pub fn extract_filename(url: &str) -> String {
    // Strip query string and fragment
    let clean_url = url.split('?').next().unwrap_or(url);
    let clean_url = clean_url.split('#').next().unwrap_or(clean_url);

    // Get last path segment
    let filename = clean_url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(sanitize_filename)
        .unwrap_or_else(|| "download".to_string());

    // If it looks like a bare domain, fall back to "download"
    if filename.contains('.') {
        let ext = filename.rsplit('.').next().unwrap_or("");
        let common_tlds = [
            "com", "org", "net", "io", "dev", "co", "uk", "de", "fr", "ru",
        ];
        if common_tlds.contains(&ext) && !filename.contains('_') && !filename.contains('-') {
            return "download".to_string();
        }
    }

    filename
}

/// Sanitize a filename for safe filesystem use.
///
/// Replaces problematic characters and handles special names.
pub fn sanitize_filename(name: &str) -> String {
    // Handle empty or special names
    if name.is_empty() || name == "." || name == ".." {
        return "download".to_string();
    }

    // Replace problematic characters
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Trim leading/trailing whitespace and dots
    let trimmed = sanitized.trim().trim_matches('.');

    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}
