//! Origin-scoped string key-value storage, the `localStorage` stand-in.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Synchronous string storage capability injected into the identity
/// resolver and the form state store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let mut store = Self::new();
        for (key, value) in entries {
            store.set(key, value);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Cloneable handle to one storage scope; every page of a session holds a
/// clone, and a write through any of them is visible to all.
#[derive(Debug, Clone, Default)]
pub struct SharedStore<S = MemoryStore> {
    inner: Rc<RefCell<S>>,
}

impl<S: KeyValueStore> SharedStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(store)),
        }
    }

    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub fn with_store_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}

impl<S: KeyValueStore> KeyValueStore for SharedStore<S> {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.inner.borrow_mut().set(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.inner.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.inner.borrow().keys()
    }
}
