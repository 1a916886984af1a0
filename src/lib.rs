//! Recipe-side helper toolkit for package builds
//!
//! Two cooperating mechanisms make up the core, plus the small utilities
//! recipes compose around them:
//!
//! - **Scoped environment mutation** ([`env`]): temporarily change
//!   environment variables, the working directory, or search-path
//!   membership, with guaranteed restoration on every exit path and correct
//!   composition under nesting.
//! - **Verified retrieval** ([`acquire`]): download a URL with retry,
//!   validate it against any number of digest expectations, and optionally
//!   unpack it in place ([`unpack`]), removing the archive artifact.
//!
//! # Example
//!
//! ```no_run
//! use recipe_tools::acquire::{DigestExpectation, DownloadOptions, HashAlgorithm, fetch_and_unpack};
//! use recipe_tools::env::{EnvDelta, ProcessEnv, with_env};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), recipe_tools::ToolError> {
//! let toolchain = EnvDelta::new()
//!     .set("CC", "clang")
//!     .prepend("PATH", ["/opt/llvm/bin"]);
//!
//! with_env(&ProcessEnv, &toolchain, || {
//!     let options = DownloadOptions {
//!         verify: vec![DigestExpectation::new(HashAlgorithm::Sha256, "abc123...")],
//!         retry: 3,
//!         ..Default::default()
//!     };
//!     fetch_and_unpack(
//!         "https://example.com/foo-1.0.tar.gz",
//!         Path::new("/tmp/build"),
//!         &options,
//!     )?;
//!     Ok(())
//! })
//! # }
//! ```
//!
//! The environment scopes mutate process-wide state when used with
//! [`env::ProcessEnv`]; a single logical thread must drive them. Tests use
//! [`env::MemoryEnv`] for isolation.

pub mod acquire;
pub mod env;
pub mod error;
mod internal;
pub mod output;
pub mod unpack;

pub use error::ToolError;
