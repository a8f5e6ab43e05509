//! kvlog - In-Memory Index
//! Maps each live key to the location of its most recent record.
//!
//! The index is a projection of the log. It is never persisted, and outside
//! this crate it can only be obtained by replaying a log (see `replay`).

use std::collections::HashMap;

use crate::types::Key;

/// Location of one record in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Byte offset where the record begins.
    pub offset: u64,
    /// Total encoded length of the record, header included.
    pub length: usize,
}

/// Key -> latest live record location.
#[derive(Debug)]
pub struct Index {
    entries: HashMap<Key, IndexEntry>,
}

impl Index {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert or overwrite the entry for `key`.
    pub(crate) fn set(&mut self, key: Key, offset: u64, length: usize) {
        self.entries.insert(key, IndexEntry { offset, length });
    }

    /// Remove the entry for `key`. No-op if absent.
    pub(crate) fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    pub fn get(&self, key: &[u8]) -> Option<IndexEntry> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over live keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }
}
