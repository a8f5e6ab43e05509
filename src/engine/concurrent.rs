//! kvlog - Shared Store Wrapper
//! Thread-safe handle around a `Store` using Arc + Mutex.
//!
//! ## Concurrency Model
//! Every operation, reads included, takes the same exclusive lock. A read
//! moves the file cursor, and an append's offset is only valid while no
//! other append can change the file length, so one lock guards both the
//! log and the index.
//!
//! Sharing one log file between processes is not supported.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::types::{Key, Value};

use super::metrics::StoreMetrics;
use super::Store;

/// Cloneable, thread-safe handle to one store.
///
/// ## Example
/// ```no_run
/// use kvlog::engine::concurrent::SharedStore;
/// use std::thread;
///
/// let store = SharedStore::open("data.log").unwrap();
///
/// let writer = store.clone();
/// thread::spawn(move || {
///     writer.put(b"key", b"value").unwrap();
/// });
///
/// let result = store.get(b"key");
/// ```
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    /// Open or create a shared store whose log lives at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_store(Store::open(path)?))
    }

    pub fn open_with_config(config: Config) -> Result<Self> {
        Ok(Self::from_store(Store::open_with_config(config)?))
    }

    /// Wrap an already opened store.
    pub fn from_store(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.lock()?.put(key, value)
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Value>> {
        self.lock()?.get(key)
    }

    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.lock()?.delete(key)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    pub fn keys(&self) -> Result<Vec<Key>> {
        Ok(self.lock()?.keys())
    }

    /// Run `f` against the store metrics while holding the lock.
    pub fn with_metrics<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&StoreMetrics) -> R,
    {
        let store = self.lock()?;
        Ok(f(store.metrics()))
    }
}
