//! Data and callbacks deferred to the end of the process.

use indexmap::IndexMap;
use serde_json::Value;

/// Callback run once, at flush or shutdown, with all accumulated data.
pub type DeferredCallback = Box<dyn FnOnce(&DeferredData) + Send>;

/// Callback registered by user code, run at shutdown before the deferred ones.
pub type UserCallback = Box<dyn FnOnce() + Send>;

/// Values appended under string keys; keys and values keep insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeferredData {
    entries: IndexMap<String, Vec<Value>>,
}

impl DeferredData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: Value) {
        self.entries.entry(key.into()).or_default().push(value);
    }

    /// Values stored under `key`, oldest first.
    pub fn get(&self, key: &str) -> &[Value] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len_of(&self, key: &str) -> usize {
        self.get(key).len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
