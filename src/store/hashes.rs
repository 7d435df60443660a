//! Hash store
//!
//! Key → (field → value) mappings. A hash is created by its first HSET and
//! stays, even if it could ever become empty.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

type Fields = HashMap<Bytes, Bytes>;

/// Hash mappings behind a single read/write lock
#[derive(Debug, Default)]
pub struct HashStore {
    data: RwLock<HashMap<Bytes, Fields>>,
}

impl HashStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` in hash `key`, creating the hash if needed (write lock).
    ///
    /// Returns true if the field was new.
    pub fn set_field(&self, key: Bytes, field: Bytes, value: Bytes) -> bool {
        self.data
            .write()
            .entry(key)
            .or_default()
            .insert(field, value)
            .is_none()
    }

    /// Get one field (read lock)
    pub fn get_field(&self, key: &[u8], field: &[u8]) -> Option<Bytes> {
        self.data.read().get(key)?.get(field).cloned()
    }

    /// Snapshot of every field/value pair of a hash, in map iteration order.
    ///
    /// `None` if the hash was never created.
    pub fn get_all(&self, key: &[u8]) -> Option<Vec<(Bytes, Bytes)>> {
        let data = self.data.read();
        let fields = data.get(key)?;
        Some(
            fields
                .iter()
                .map(|(f, v)| (f.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.data.read().contains_key(key)
    }

    /// Number of hashes
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}
