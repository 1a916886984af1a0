//! Scoped environment mutation
//!
//! Recipes routinely need to run a block of logic under a modified
//! environment: a compiler toolchain prepended to `PATH`, a different
//! working directory, a tool hidden from resolution. These helpers make
//! every such mutation a scope with guaranteed symmetric teardown.
//!
//! ## Example
//!
//! ```
//! use recipe_tools::env::{EnvDelta, EnvStore, MemoryEnv, with_env};
//!
//! let store = MemoryEnv::with_vars([("PATH", "/usr/bin")]);
//! let delta = EnvDelta::new()
//!     .set("CC", "clang")
//!     .prepend("PATH", ["/opt/llvm/bin"]);
//!
//! let out: Result<String, std::convert::Infallible> = with_env(&store, &delta, || {
//!     Ok(store.get("PATH").unwrap())
//! });
//! assert_eq!(out.unwrap(), "/opt/llvm/bin:/usr/bin");
//! assert_eq!(store.get("PATH").unwrap(), "/usr/bin");
//! assert_eq!(store.get("CC"), None);
//! ```

mod scope;
mod search_path;
mod store;

pub use scope::{CwdScope, EnvChange, EnvDelta, EnvScope, with_env};
pub use search_path::{
    PATH_VAR, SCRIPT_PATH_VAR, find_in_path, with_cwd, with_path_prepended, with_script_paths,
    without_from_path,
};
pub use store::{EnvStore, MemoryEnv, ProcessEnv};

/// Platform list separator for PATH-like variables.
#[cfg(windows)]
pub const LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const LIST_SEPARATOR: char = ':';
