//! Verified file download with retry
//!
//! The retrieval pipeline: conflict check, attempt loop with a fixed wait
//! between attempts, streaming write into a temporary file, then digest
//! verification against every caller-supplied expectation.

use crate::error::ToolError;
use crate::internal::fs_utils;
use crate::internal::progress::{self, ProgressGuard, upgrade_to_bytes};
use crate::output;
use base64::Engine as _;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

use super::checksum::{self, DigestExpectation};
use super::http;

/// Credentials attached to every download attempt.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

/// Policy for one retrieval.
///
/// Everything is caller-supplied; nothing is read implicitly from the
/// environment except the transport timeout.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Digest expectations; every one must match (conjunction).
    pub verify: Vec<DigestExpectation>,
    /// Total attempts (>= 1). A value of 0 is treated as 1.
    pub retry: u32,
    /// Fixed wait between attempts.
    pub retry_wait: Duration,
    /// Replace an existing destination instead of raising a conflict.
    pub overwrite: bool,
    /// Basic-auth credentials, attached identically on every attempt.
    pub auth: Option<BasicAuth>,
    /// Extra request headers, attached identically on every attempt.
    pub headers: Vec<(String, String)>,
    /// Suppress the progress indicator.
    pub quiet: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            verify: Vec::new(),
            retry: 1,
            retry_wait: Duration::from_secs(5),
            overwrite: false,
            auth: None,
            headers: Vec::new(),
            quiet: false,
        }
    }
}

/// One attempt's failure, classified for the retry loop.
#[derive(Debug)]
enum AttemptError {
    /// Request-level failure from the transport or an HTTP status.
    Http(ureq::Error),
    /// Mid-body read failure; the connection died while streaming.
    Io(std::io::Error),
    /// Local failure that retrying will not fix; aborts the loop.
    Fatal(ToolError),
}

impl AttemptError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(ureq::Error::Status(code, _)) => *code >= 500 || *code == 429,
            Self::Http(ureq::Error::Transport(_)) => true,
            Self::Io(_) => true,
            Self::Fatal(_) => false,
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "connection lost while streaming: {e}"),
            Self::Fatal(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AttemptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Fatal(e) => Some(e),
        }
    }
}

/// Download a file from a URL to a specific destination.
///
/// Returns the number of bytes written. If `options.verify` is non-empty,
/// every digest expectation is checked after the download; a mismatch
/// raises [`ToolError::Integrity`] and leaves the file in place for
/// inspection.
///
/// # Example
/// ```no_run
/// use recipe_tools::acquire::{DownloadOptions, download};
/// use std::path::Path;
///
/// # fn main() -> Result<(), recipe_tools::ToolError> {
/// let options = DownloadOptions {
///     retry: 3,
///     ..Default::default()
/// };
/// download(
///     "https://example.com/foo-1.0.tar.gz",
///     Path::new("/tmp/foo-1.0.tar.gz"),
///     &options,
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn download(url: &str, dest: &Path, options: &DownloadOptions) -> Result<u64, ToolError> {
    if dest.exists() {
        if !options.overwrite {
            return Err(ToolError::Conflict {
                path: dest.to_path_buf(),
            });
        }
        // Discard the stale destination so every overwrite run converges
        // on the same outcome.
        std::fs::remove_file(dest)
            .map_err(|e| ToolError::io(format!("cannot remove {}", dest.display()), e))?;
    }
    fs_utils::ensure_parent_dir(dest)?;

    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    let attempts_allowed = options.retry.max(1);
    let mut attempt = 0u32;

    let total_bytes = loop {
        attempt += 1;
        match download_attempt(url, dest, options, &filename) {
            Ok(bytes) => break bytes,
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(e) if attempt < attempts_allowed && e.is_transient() => {
                output::warning(&format!(
                    "download attempt {}/{} failed: {}",
                    attempt, attempts_allowed, e
                ));
                std::thread::sleep(options.retry_wait);
            }
            Err(e) => {
                return Err(ToolError::Network {
                    url: url.to_string(),
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
        }
    };

    output::detail(&format!("downloaded {} ({} bytes)", filename, total_bytes));

    checksum::verify_expectations(dest, &options.verify)?;
    Ok(total_bytes)
}

/// One GET attempt: stream the body into a temp file next to `dest`, then
/// move it into place. A failed attempt leaves no partial file behind.
fn download_attempt(
    url: &str,
    dest: &Path,
    options: &DownloadOptions,
    filename: &str,
) -> Result<u64, AttemptError> {
    let pb = progress::create_download_progress(
        &format!("downloading {}", filename),
        options.quiet,
    );
    let _guard = ProgressGuard::new(&pb);

    let mut request = ureq::get(url).timeout(http::get_http_timeout());
    for (name, value) in &options.headers {
        request = request.set(name, value);
    }
    if let Some(auth) = &options.auth {
        request = request.set("Authorization", &auth.header_value());
    }

    let response = request.call().map_err(AttemptError::Http)?;

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse::<u64>().ok())
    {
        fs_utils::check_disk_space(parent, len).map_err(AttemptError::Fatal)?;
        upgrade_to_bytes(&pb, len);
    }

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| {
        AttemptError::Fatal(ToolError::io(
            format!("cannot create temporary file in {}", parent.display()),
            e,
        ))
    })?;

    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let n = reader.read(&mut buffer).map_err(AttemptError::Io)?;
        if n == 0 {
            break;
        }

        tmp.write_all(&buffer[..n]).map_err(|e| {
            AttemptError::Fatal(ToolError::io(
                format!("cannot write to temporary file in {}", parent.display()),
                e,
            ))
        })?;

        total_bytes += n as u64;
        pb.set_position(total_bytes);
    }

    tmp.persist(dest).map_err(|e| {
        AttemptError::Fatal(ToolError::io(
            format!("cannot move download into place at {}", dest.display()),
            e.error,
        ))
    })?;

    Ok(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header_value() {
        // RFC 7617 example pair
        let auth = BasicAuth::new("Aladdin", "open sesame");
        assert_eq!(auth.header_value(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn test_conflict_without_overwrite() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("existing.bin");
        std::fs::write(&dest, b"original contents").unwrap();

        let result = download("http://127.0.0.1:1/unreachable", &dest, &DownloadOptions::default());
        assert!(matches!(result, Err(ToolError::Conflict { .. })));

        // No request was issued and the file is byte-for-byte unchanged.
        assert_eq!(std::fs::read(&dest).unwrap(), b"original contents");
    }

    #[test]
    fn test_status_transience_classification() {
        // 5xx and 429 retry; 4xx fails fast.
        let server_err = AttemptError::Http(ureq::Error::Status(
            503,
            ureq::Response::new(503, "Service Unavailable", "").unwrap(),
        ));
        assert!(server_err.is_transient());

        let throttled = AttemptError::Http(ureq::Error::Status(
            429,
            ureq::Response::new(429, "Too Many Requests", "").unwrap(),
        ));
        assert!(throttled.is_transient());

        let not_found = AttemptError::Http(ureq::Error::Status(
            404,
            ureq::Response::new(404, "Not Found", "").unwrap(),
        ));
        assert!(!not_found.is_transient());

        let fatal = AttemptError::Fatal(ToolError::io(
            "local failure",
            std::io::Error::other("disk on fire"),
        ));
        assert!(!fatal.is_transient());
    }
}
