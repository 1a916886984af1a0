//! Error types for the toolkit
//!
//! Every failure a helper can surface is a variant of [`ToolError`], so
//! callers can match on what went wrong instead of parsing message strings.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the retrieval pipeline and environment scopes.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Destination already exists and overwrite was not requested.
    /// No bytes were written.
    #[error("destination already exists: {} (pass overwrite to replace)", path.display())]
    Conflict { path: PathBuf },

    /// All download attempts failed. Carries the total attempts made and
    /// the final attempt's underlying cause.
    #[error("download failed after {attempts} attempt(s): {url}")]
    Network {
        url: String,
        attempts: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A digest expectation did not match. The downloaded file is left in
    /// place so the mismatch can be inspected.
    #[error(
        "{algorithm} integrity check failed for '{}'\n  expected: {expected}\n  got:      {actual}",
        path.display()
    )]
    Integrity {
        algorithm: &'static str,
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Unpack was requested for a filename with no recognized archive suffix.
    #[error(
        "unsupported archive format: {filename} \
         (supported: .tar.gz, .tgz, .tar.xz, .txz, .tar.bz2, .tbz2, .tar.zst, .tzst, .tar, .zip)"
    )]
    UnsupportedFormat { filename: String },

    /// A hash algorithm name that this toolkit does not provide.
    #[error("unknown hash algorithm: {name} (supported: md5, sha256, sha512, sha3-256, blake3)")]
    UnknownAlgorithm { name: String },

    /// The platform environment store is inaccessible (cwd lookup/switch).
    #[error("environment store inaccessible: {context}")]
    EnvAccess {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Not enough free space at the destination for the advertised size.
    #[error(
        "not enough disk space in {}: need {needed} bytes, {available} available",
        path.display()
    )]
    DiskSpace {
        path: PathBuf,
        needed: u64,
        available: u64,
    },

    /// Archive could not be extracted (corrupt data or unsafe entry paths).
    #[error("cannot unpack {}: {reason}", path.display())]
    Unpack { path: PathBuf, reason: String },

    /// Filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Shorthand for wrapping an I/O error with a short context string.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
