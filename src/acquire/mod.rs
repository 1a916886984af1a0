//! Acquire helpers - getting and validating sources
//!
//! The verified retrieval pipeline and its pieces.
//!
//! ## Functions
//!
//! - **download**: download a URL to a destination with retry and digest
//!   verification
//! - **fetch_and_unpack**: download, verify, extract, drop the archive
//! - **checksum_file / verify_expectations**: digest validation
//! - **hash_file / compute_all_hashes**: digest computation
//! - **http_get**: fetch remote text content

pub mod checksum;
pub mod download;
pub mod get;
pub mod http;

// Re-export commonly used items
pub use checksum::{
    DigestExpectation, FileHashes, HashAlgorithm, checksum_file, compute_all_hashes, hash_file,
    verify_expectations,
};
pub use download::{BasicAuth, DownloadOptions, download};
pub use get::fetch_and_unpack;
pub use http::http_get;

/// Derive a local filename from a download URL.
pub use crate::internal::url_utils::extract_filename as filename_from_url;
