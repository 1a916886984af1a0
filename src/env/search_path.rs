//! Search-path and working-directory scopes
//!
//! Specializations of the scope primitive: temporarily change the cwd,
//! prepend directories to `PATH`, hide an executable from `PATH`, or inject
//! auxiliary recipe-script search paths.

use super::scope::{CwdScope, EnvDelta, EnvScope};
use super::store::EnvStore;
use super::LIST_SEPARATOR;
use crate::error::ToolError;
use std::path::{Path, PathBuf};

/// The executable search-path variable.
pub const PATH_VAR: &str = "PATH";

/// Dedicated variable for dependency-provided recipe helper scripts.
pub const SCRIPT_PATH_VAR: &str = "RTOOL_SCRIPT_PATH";

/// Run `body` with the working directory temporarily switched to `dir`.
///
/// The previous directory is restored even when `body` errors.
pub fn with_cwd<S, T, E, F>(store: &S, dir: &Path, body: F) -> Result<T, E>
where
    S: EnvStore,
    E: From<ToolError>,
    F: FnOnce() -> Result<T, E>,
{
    let _scope = CwdScope::enter(store, dir)?;
    body()
}

/// Run `body` with `dirs` prepended to `PATH`.
pub fn with_path_prepended<S, T, E, F>(store: &S, dirs: &[&str], body: F) -> Result<T, E>
where
    S: EnvStore,
    F: FnOnce() -> Result<T, E>,
{
    let delta = EnvDelta::new().prepend(PATH_VAR, dirs.iter().copied());
    let _scope = EnvScope::enter(store, &delta);
    body()
}

/// Run `body` with `dirs` prepended to the recipe-script search path.
pub fn with_script_paths<S, T, E, F>(store: &S, dirs: &[&str], body: F) -> Result<T, E>
where
    S: EnvStore,
    F: FnOnce() -> Result<T, E>,
{
    let delta = EnvDelta::new().prepend(SCRIPT_PATH_VAR, dirs.iter().copied());
    let _scope = EnvScope::enter(store, &delta);
    body()
}

/// Run `body` with every `PATH` entry that provides `exe_name` removed.
///
/// The full original `PATH` value is captured on entry and restored on exit,
/// regardless of how `body` exits. With no `PATH` set this is a no-op scope.
pub fn without_from_path<S, T, E, F>(store: &S, exe_name: &str, body: F) -> Result<T, E>
where
    S: EnvStore,
    F: FnOnce() -> Result<T, E>,
{
    let _scope = match store.get(PATH_VAR) {
        Some(original) => {
            let sep = LIST_SEPARATOR.to_string();
            let filtered = original
                .split(LIST_SEPARATOR)
                .filter(|entry| !provides_executable(Path::new(entry), exe_name))
                .collect::<Vec<_>>()
                .join(&sep);
            EnvScope::enter(store, &EnvDelta::new().set(PATH_VAR, filtered))
        }
        None => EnvScope::noop(store),
    };
    body()
}

/// Resolve `exe_name` against the store's `PATH`, first match wins.
pub fn find_in_path<S: EnvStore>(store: &S, exe_name: &str) -> Option<PathBuf> {
    let path = store.get(PATH_VAR)?;
    path.split(LIST_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .map(|entry| Path::new(entry).join(exe_name))
        .find(|candidate| is_executable(candidate))
}

/// Does `dir` contain an executable named `exe_name`?
fn provides_executable(dir: &Path, exe_name: &str) -> bool {
    is_executable(&dir.join(exe_name))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    const EXTENSIONS: &[&str] = &["exe", "bat", "cmd"];
    if path.is_file() {
        return true;
    }
    EXTENSIONS
        .iter()
        .any(|ext| path.with_extension(ext).is_file())
}
