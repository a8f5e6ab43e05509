//! kvlog - Error Types
//! Defines the error hierarchy for the log-structured store.

use thiserror::Error;

/// Custom Result type for kvlog.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for the kvlog store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O errors from the log file (open, seek, read, write, sync).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored checksum does not match the key and value bytes.
    #[error("data corrupted: checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    CorruptRecord { stored: u32, computed: u32 },

    /// Fewer bytes were available than the record header promised.
    #[error("truncated record: expected {expected} bytes, found {found}")]
    Truncated { expected: u64, found: u64 },

    /// Key or value does not fit in the 32-bit length field.
    #[error("record too large: {0} bytes")]
    RecordTooLarge(usize),

    /// Caller supplied an argument the store cannot represent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Replay stopped before end-of-file, so new records would land after
    /// bytes that replay cannot get past. Writes are refused until the log
    /// is repaired.
    #[error("store is read-only: log has {discarded} unreadable bytes after offset {valid_len}")]
    ReadOnly { valid_len: u64, discarded: u64 },

    /// Replay offset bookkeeping disagrees with the file cursor.
    #[error("log framing mismatch: computed offset {computed}, file position {actual}")]
    FramingMismatch { computed: u64, actual: u64 },

    /// A thread panicked while holding the store lock.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    /// Returns true for checksum failures, the data-integrity class of error.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::CorruptRecord { .. })
    }
}
