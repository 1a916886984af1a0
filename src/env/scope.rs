//! Scoped environment mutation
//!
//! An [`EnvScope`] applies an [`EnvDelta`] to a store and restores the prior
//! state when dropped, including on error paths. Scopes nest: each one
//! captures only the variables its own delta names, and unwinding guards in
//! reverse order of entry restores the original state exactly.

use super::store::EnvStore;
use super::LIST_SEPARATOR;
use crate::output;
use std::collections::BTreeMap;

/// One proposed change to a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvChange {
    /// Replace the variable with this value.
    Scalar(String),
    /// Join these values with the platform list separator and prepend them
    /// to the existing value. If the variable is absent, the joined values
    /// become the whole value.
    Prepend(Vec<String>),
}

/// A set of proposed environment changes, one per variable.
///
/// Keys are unique (map semantics); application order across keys is
/// unspecified, but each key's effect is deterministic.
///
/// # Example
/// ```
/// use recipe_tools::env::EnvDelta;
///
/// let delta = EnvDelta::new()
///     .set("CC", "clang")
///     .prepend("PATH", ["/opt/toolchain/bin"]);
/// assert_eq!(delta.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvDelta {
    changes: BTreeMap<String, EnvChange>,
}

impl EnvDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `name` with `value` for the duration of the scope.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.changes
            .insert(name.into(), EnvChange::Scalar(value.into()));
        self
    }

    /// Prepend `values` to `name` (list semantics) for the duration of the
    /// scope.
    pub fn prepend<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.changes.insert(
            name.into(),
            EnvChange::Prepend(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvChange)> {
        self.changes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// RAII scope over an environment store.
///
/// Entering captures the prior value of every variable the delta names and
/// applies the delta; dropping restores exactly the captured state, whether
/// the scope body returned or propagated an error. Restoration is an
/// unconditional overwrite/unset, not a merge, so it holds even if code
/// inside the scope mutated the same variables.
///
/// # Example
/// ```
/// use recipe_tools::env::{EnvDelta, EnvScope, EnvStore, MemoryEnv};
///
/// let store = MemoryEnv::new();
/// store.set("PATH", "/usr/bin");
/// {
///     let _scope = EnvScope::enter(&store, &EnvDelta::new().prepend("PATH", ["/opt/bin"]));
///     assert_eq!(store.get("PATH").unwrap(), "/opt/bin:/usr/bin");
/// }
/// assert_eq!(store.get("PATH").unwrap(), "/usr/bin");
/// ```
#[must_use = "the scope restores the environment when dropped"]
pub struct EnvScope<'a, S: EnvStore> {
    store: &'a S,
    /// Captured prior state: `None` means the variable was absent.
    frame: Vec<(String, Option<String>)>,
}

impl<'a, S: EnvStore> EnvScope<'a, S> {
    /// Capture prior state for every key in `delta`, then apply it.
    pub fn enter(store: &'a S, delta: &EnvDelta) -> Self {
        let mut frame = Vec::with_capacity(delta.len());

        for (name, change) in delta.iter() {
            let previous = store.get(name);
            let next = match change {
                EnvChange::Scalar(value) => value.clone(),
                EnvChange::Prepend(values) => {
                    let joined = values.join(&LIST_SEPARATOR.to_string());
                    match &previous {
                        Some(existing) if !existing.is_empty() => {
                            format!("{joined}{LIST_SEPARATOR}{existing}")
                        }
                        _ => joined,
                    }
                }
            };
            frame.push((name.to_string(), previous));
            store.set(name, &next);
        }

        Self { store, frame }
    }

    /// A scope that changes nothing and restores nothing.
    ///
    /// Lets call sites conditionally pick between a real scope and "do
    /// nothing" without branching their scope management.
    pub fn noop(store: &'a S) -> Self {
        Self {
            store,
            frame: Vec::new(),
        }
    }

    /// Restore eagerly instead of waiting for drop.
    pub fn restore(mut self) {
        self.unwind();
        self.frame.clear();
    }

    fn unwind(&mut self) {
        // Restore in reverse capture order. Keys within one delta are
        // unique, so the order only matters if a caller pushed the same
        // key twice via nested scopes, which each guard handles itself.
        for (name, previous) in self.frame.iter().rev() {
            match previous {
                Some(value) => self.store.set(name, value),
                None => self.store.unset(name),
            }
        }
    }
}

impl<S: EnvStore> Drop for EnvScope<'_, S> {
    fn drop(&mut self) {
        self.unwind();
    }
}

/// Run `body` with `delta` applied, restoring the prior state afterwards.
///
/// The restore runs whether `body` returns or errors, and never replaces an
/// in-flight error.
pub fn with_env<S, T, E, F>(store: &S, delta: &EnvDelta, body: F) -> Result<T, E>
where
    S: EnvStore,
    F: FnOnce() -> Result<T, E>,
{
    let _scope = EnvScope::enter(store, delta);
    body()
}

/// RAII scope over the store's current working directory.
///
/// Captures the cwd, switches to `dir`, and switches back on drop.
#[must_use = "the scope restores the working directory when dropped"]
pub struct CwdScope<'a, S: EnvStore> {
    store: &'a S,
    previous: std::path::PathBuf,
}

impl<'a, S: EnvStore> CwdScope<'a, S> {
    pub fn enter(store: &'a S, dir: &std::path::Path) -> Result<Self, crate::error::ToolError> {
        let previous = store.current_dir()?;
        store.set_current_dir(dir)?;
        Ok(Self { store, previous })
    }
}

impl<S: EnvStore> Drop for CwdScope<'_, S> {
    fn drop(&mut self) {
        // Restoration failure must not panic or mask an in-flight error.
        if let Err(e) = self.store.set_current_dir(&self.previous) {
            output::warning(&format!(
                "could not restore working directory to {}: {}",
                self.previous.display(),
                e
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryEnv;

    #[test]
    fn test_scalar_roundtrip() {
        let store = MemoryEnv::with_vars([("CC", "gcc")]);

        {
            let _scope = EnvScope::enter(&store, &EnvDelta::new().set("CC", "clang"));
            assert_eq!(store.get("CC").unwrap(), "clang");
        }
        assert_eq!(store.get("CC").unwrap(), "gcc");
    }

    #[test]
    fn test_absent_variable_restored_to_absent() {
        let store = MemoryEnv::new();

        {
            let _scope = EnvScope::enter(&store, &EnvDelta::new().set("NEWVAR", "x"));
            assert_eq!(store.get("NEWVAR").unwrap(), "x");
        }
        assert_eq!(store.get("NEWVAR"), None);
    }

    #[test]
    fn test_prepend_joins_with_existing() {
        let store = MemoryEnv::with_vars([("PATH", "/usr/bin:/bin")]);

        {
            let _scope = EnvScope::enter(
                &store,
                &EnvDelta::new().prepend("PATH", ["/opt/a/bin", "/opt/b/bin"]),
            );
            assert_eq!(store.get("PATH").unwrap(), "/opt/a/bin:/opt/b/bin:/usr/bin:/bin");
        }
        assert_eq!(store.get("PATH").unwrap(), "/usr/bin:/bin");
    }

    #[test]
    fn test_prepend_onto_absent_is_join_alone() {
        let store = MemoryEnv::new();

        {
            let _scope =
                EnvScope::enter(&store, &EnvDelta::new().prepend("LDPATH", ["/a", "/b"]));
            assert_eq!(store.get("LDPATH").unwrap(), "/a:/b");
        }
        assert_eq!(store.get("LDPATH"), None);
    }

    #[test]
    fn test_nested_scopes_unwind_lifo() {
        let store = MemoryEnv::with_vars([("PATH", "/bin"), ("CC", "gcc")]);

        {
            let _outer = EnvScope::enter(
                &store,
                &EnvDelta::new().prepend("PATH", ["/outer"]).set("CC", "clang"),
            );
            {
                let _inner = EnvScope::enter(
                    &store,
                    &EnvDelta::new().prepend("PATH", ["/inner"]).set("CC", "tcc"),
                );
                assert_eq!(store.get("PATH").unwrap(), "/inner:/outer:/bin");
                assert_eq!(store.get("CC").unwrap(), "tcc");
            }
            assert_eq!(store.get("PATH").unwrap(), "/outer:/bin");
            assert_eq!(store.get("CC").unwrap(), "clang");
        }
        assert_eq!(store.get("PATH").unwrap(), "/bin");
        assert_eq!(store.get("CC").unwrap(), "gcc");
    }

    #[test]
    fn test_restore_is_unconditional_overwrite() {
        let store = MemoryEnv::with_vars([("CC", "gcc")]);

        {
            let _scope = EnvScope::enter(&store, &EnvDelta::new().set("CC", "clang"));
            // Intervening mutation inside the scope body.
            store.set("CC", "icc");
        }
        assert_eq!(store.get("CC").unwrap(), "gcc");
    }

    #[test]
    fn test_restore_unsets_even_if_body_set_it() {
        let store = MemoryEnv::new();

        {
            let _scope = EnvScope::enter(&store, &EnvDelta::new().set("TMP", "1"));
            store.set("TMP", "2");
        }
        assert_eq!(store.get("TMP"), None);
    }

    #[test]
    fn test_noop_scope_changes_nothing() {
        let store = MemoryEnv::with_vars([("A", "1")]);
        let before = store.snapshot();

        {
            let _scope = EnvScope::noop(&store);
        }
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_eager_restore() {
        let store = MemoryEnv::new();

        let scope = EnvScope::enter(&store, &EnvDelta::new().set("X", "1"));
        assert_eq!(store.get("X").unwrap(), "1");
        scope.restore();
        assert_eq!(store.get("X"), None);
    }

    #[test]
    fn test_with_env_restores_on_error() {
        let store = MemoryEnv::with_vars([("CC", "gcc")]);

        let result: Result<(), &str> =
            with_env(&store, &EnvDelta::new().set("CC", "clang"), || {
                assert_eq!(store.get("CC").unwrap(), "clang");
                Err("boom")
            });

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(store.get("CC").unwrap(), "gcc");
    }

    #[test]
    fn test_cwd_scope_roundtrip() {
        let store = MemoryEnv::new();
        store.set_current_dir(std::path::Path::new("/start")).unwrap();

        {
            let _scope = CwdScope::enter(&store, std::path::Path::new("/elsewhere")).unwrap();
            assert_eq!(store.current_dir().unwrap(), std::path::PathBuf::from("/elsewhere"));
        }
        assert_eq!(store.current_dir().unwrap(), std::path::PathBuf::from("/start"));
    }
}
