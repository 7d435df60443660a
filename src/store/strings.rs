//! Flat key/value store
//!
//! HashMap-based store with RwLock for concurrency.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

/// Key → value mapping behind a single read/write lock
#[derive(Debug, Default)]
pub struct StringStore {
    data: RwLock<HashMap<Bytes, Bytes>>,
}

impl StringStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.read().get(key).cloned()
    }

    /// Set a key, replacing any previous value (write lock)
    pub fn set(&self, key: Bytes, value: Bytes) {
        self.data.write().insert(key, value);
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.data.read().contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}
