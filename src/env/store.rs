//! Environment store abstraction
//!
//! Scopes mutate state through the [`EnvStore`] trait rather than touching
//! `std::env` directly, so the scope laws can be tested against an in-memory
//! store without process-global side effects.

use crate::error::ToolError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A process-wide key-value environment store plus a current directory.
///
/// Methods take `&self`: the underlying stores are shared by nature, and
/// nested scopes need to hold the store concurrently.
pub trait EnvStore {
    /// Read a variable. `None` means absent.
    fn get(&self, name: &str) -> Option<String>;

    /// Set a variable, replacing any previous value.
    fn set(&self, name: &str, value: &str);

    /// Remove a variable. Removing an absent variable is a no-op.
    fn unset(&self, name: &str);

    /// The store's current working directory.
    fn current_dir(&self) -> Result<PathBuf, ToolError>;

    /// Switch the store's current working directory.
    fn set_current_dir(&self, dir: &Path) -> Result<(), ToolError>;
}

/// The real process environment.
///
/// Variable mutation assumes a single logical thread drives environment
/// scopes at any one time; concurrent scopes must go through [`MemoryEnv`]
/// or be serialized by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&self, name: &str, value: &str) {
        // SAFETY: environment scopes run on a single logical thread; the
        // caller must ensure no other threads read env vars concurrently.
        unsafe { std::env::set_var(name, value) };
    }

    fn unset(&self, name: &str) {
        // SAFETY: see `set`.
        unsafe { std::env::remove_var(name) };
    }

    fn current_dir(&self) -> Result<PathBuf, ToolError> {
        std::env::current_dir().map_err(|e| ToolError::EnvAccess {
            context: "cannot read current directory".to_string(),
            source: e,
        })
    }

    fn set_current_dir(&self, dir: &Path) -> Result<(), ToolError> {
        std::env::set_current_dir(dir).map_err(|e| ToolError::EnvAccess {
            context: format!("cannot change directory to {}", dir.display()),
            source: e,
        })
    }
}

/// In-memory environment store for tests.
///
/// Fully isolated from the process environment; the current directory is a
/// plain value with no filesystem validation.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: Mutex<HashMap<String, String>>,
    cwd: Mutex<PathBuf>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self {
            vars: Mutex::new(HashMap::new()),
            cwd: Mutex::new(PathBuf::from("/")),
        }
    }

    /// Build a store pre-populated with the given variables.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.vars.lock().expect("env store poisoned");
            for (k, v) in vars {
                map.insert(k.into(), v.into());
            }
        }
        store
    }

    /// Snapshot of every variable, for assertions.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.vars.lock().expect("env store poisoned").clone()
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.lock().expect("env store poisoned").get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.vars
            .lock()
            .expect("env store poisoned")
            .insert(name.to_string(), value.to_string());
    }

    fn unset(&self, name: &str) {
        self.vars.lock().expect("env store poisoned").remove(name);
    }

    fn current_dir(&self) -> Result<PathBuf, ToolError> {
        Ok(self.cwd.lock().expect("env store poisoned").clone())
    }

    fn set_current_dir(&self, dir: &Path) -> Result<(), ToolError> {
        *self.cwd.lock().expect("env store poisoned") = dir.to_path_buf();
        Ok(())
    }
}
