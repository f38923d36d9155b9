//! Variable store.
//!
//! A plain string-valued table keyed by canonical variable name.  Lookups
//! through [`VarStore::locate`] auto-vivify: a missing name is inserted with
//! an empty value and a handle to the new slot is returned, so callers can
//! assign into a variable that did not exist yet.
//!
//! The store is an ordinary value.  Callers construct one and pass it to
//! whatever needs it; [`SharedVarStore`] wraps one behind a mutex for hosts
//! with more than one thread.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Anything the translator can resolve canonical keys against.
pub trait VarSource {
    /// Current value of `key`, creating it empty if absent.
    fn lookup(&mut self, key: &str) -> String;
}

/// Key/value variable store.
#[derive(Debug, Default, Clone)]
pub struct VarStore {
    vars: HashMap<String, String>,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable handle to `name`, inserting an empty value if it is missing.
    pub fn locate(&mut self, name: &str) -> &mut String {
        if !self.vars.contains_key(name) {
            tracing::trace!(name, "auto-vivifying variable");
        }
        self.vars.entry(name.to_owned()).or_default()
    }

    /// Set (or overwrite) a variable.
    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Value of a variable, without creating it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns `true` if the variable exists (possibly empty).
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Iterate over all variables.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    /// Drop every variable.
    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl VarSource for VarStore {
    fn lookup(&mut self, key: &str) -> String {
        self.locate(key).clone()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VarStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = VarStore::new();
        for (k, v) in iter {
            store.assign(k, v);
        }
        store
    }
}

// ── Shared store ──────────────────────────────────────────────────────────────

/// A [`VarStore`] shared between threads.
///
/// Every operation takes the lock for a single lookup or insert only, so a
/// long translation on one thread never blocks another for its whole length.
#[derive(Debug, Default, Clone)]
pub struct SharedVarStore {
    inner: Arc<Mutex<VarStore>>,
}

impl SharedVarStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VarStore> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` on the (auto-vivified) slot for `name` under the lock.
    pub fn locate_with<R>(&self, name: &str, f: impl FnOnce(&mut String) -> R) -> R {
        f(self.lock().locate(name))
    }

    pub fn assign(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock().assign(name, value);
    }

    /// Copy of a variable's value, without creating it.
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).map(str::to_owned)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Copy of the whole table.
    pub fn snapshot(&self) -> VarStore {
        self.lock().clone()
    }
}

impl From<VarStore> for SharedVarStore {
    fn from(store: VarStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }
}

impl VarSource for SharedVarStore {
    fn lookup(&mut self, key: &str) -> String {
        self.locate_with(key, |v| v.clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
