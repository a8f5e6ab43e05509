//! kvlog - Core Type Definitions
//! Defines fundamental types used across the store.

/// Key type for the store.
/// Using Vec<u8> allows arbitrary binary keys.
pub type Key = Vec<u8>;

/// Value type for the store.
/// Using Vec<u8> allows arbitrary binary values.
pub type Value = Vec<u8>;

/// One decoded log record.
/// An empty value marks the record as a tombstone (deletion marker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Key,
    pub value: Value,
}

impl Record {
    /// Create a record carrying a value (PUT operation).
    pub fn put(key: Key, value: Value) -> Self {
        Self { key, value }
    }

    /// Create a tombstone record (DELETE operation).
    pub fn tombstone(key: Key) -> Self {
        Self {
            key,
            value: Vec::new(),
        }
    }

    /// Returns true if this record is a tombstone.
    pub fn is_tombstone(&self) -> bool {
        self.value.is_empty()
    }

    /// Size of this record once encoded, header included.
    pub fn encoded_len(&self) -> usize {
        crate::engine::codec::encoded_len(self.key.len(), self.value.len())
    }
}
