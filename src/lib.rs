//! kvlog - Append-Only Log Key-Value Store
//!
//! A persistent key-value store backed by a single append-only log file,
//! with an in-memory index rebuilt from the log on every open.
//!
//! ## Features
//! - **Record Codec**: fixed 12-byte little-endian header, CRC-32 over key and value
//! - **Append Log**: offset-addressed, write-once storage; the only durable state
//! - **Index**: key -> (offset, length) of the latest live record
//! - **Replay**: deterministic fold of the log into the index on open,
//!   stopping at the first corrupt or truncated record
//! - **Tombstones**: deletes append a record with an empty value
//! - **Concurrency**: `SharedStore`, an Arc + Mutex handle for multi-threaded callers
//!
//! ## Example
//! ```no_run
//! use kvlog::Store;
//!
//! let mut store = Store::open("data.log").unwrap();
//!
//! store.put(b"key", b"value").unwrap();
//! assert_eq!(store.get(b"key").unwrap(), Some(b"value".to_vec()));
//!
//! store.delete(b"key").unwrap();
//! assert_eq!(store.get(b"key").unwrap(), None);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use config::Config;
pub use engine::concurrent::SharedStore;
pub use engine::Store;
pub use error::{Result, StoreError};
