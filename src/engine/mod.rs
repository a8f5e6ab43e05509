//! kvlog - Storage Engine Module
//! Ties the record codec, append log and index together into a store.

pub mod append_log;
pub mod codec;
pub mod concurrent;
pub mod index;
pub mod metrics;
pub mod replay;

use std::path::Path;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::types::{Key, Value};

use self::append_log::AppendLog;
use self::index::Index;
use self::metrics::StoreMetrics;
use self::replay::ReplayReport;

/// A persistent key-value store backed by a single append-only log.
///
/// The store exclusively owns its log file; the index is rebuilt from the
/// log on every open and dropped with the store.
pub struct Store {
    /// Durable record storage, the source of truth.
    log: AppendLog,
    /// Key -> location of the latest live record.
    index: Index,
    /// Outcome of the replay performed at open.
    recovery: ReplayReport,
    metrics: StoreMetrics,
    config: Config,
}

impl Store {
    /// Open or create a store whose log lives at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(Config::new(path.as_ref()))
    }

    /// Open or create a store with explicit configuration.
    /// Replays the whole log to rebuild the index before returning.
    pub fn open_with_config(config: Config) -> Result<Self> {
        config.ensure_dirs()?;

        let mut log = AppendLog::open(&config.path, config.sync_writes)?;
        let (index, recovery) = replay::replay(&mut log)?;

        let metrics = StoreMetrics::new();
        metrics.record_replay(recovery.records);

        log::info!(
            "kvlog store opened at {:?} ({} records replayed, {} live keys)",
            config.path,
            recovery.records,
            index.len()
        );

        Ok(Self {
            log,
            index,
            recovery,
            metrics,
            config,
        })
    }

    /// Insert or overwrite `key`.
    /// The write path: log (disk) -> index (memory). A crash between the
    /// two steps is repaired by the replay on next open.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidArgument("key must not be empty".into()));
        }
        if value.is_empty() {
            return Err(StoreError::InvalidArgument(
                "value must not be empty; use delete to remove a key".into(),
            ));
        }

        self.ensure_writable()?;

        let (offset, length) = self.log.append(key, value)?;
        self.index.set(key.to_vec(), offset, length);
        self.metrics.record_put(length);
        Ok(())
    }

    /// Fetch the current value of `key`, or `None` if it is not live.
    ///
    /// A checksum failure at the indexed location is returned as
    /// `StoreError::CorruptRecord`, never as `None`.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Value>> {
        let entry = match self.index.get(key) {
            Some(entry) => entry,
            None => {
                self.metrics.record_get(None);
                return Ok(None);
            }
        };

        let record = match self.log.read_at(entry.offset) {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_failed_get(e.is_corruption());
                return Err(e);
            }
        };

        if record.key != key || record.is_tombstone() {
            log::warn!(
                "index points at offset {} but the record there does not hold a live value for the requested key",
                entry.offset
            );
            self.metrics.record_get(None);
            return Ok(None);
        }

        self.metrics.record_get(Some(record.value.len()));
        Ok(Some(record.value))
    }

    /// Delete `key` by appending a tombstone.
    /// Succeeds (and still grows the log) when the key was never written.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidArgument("key must not be empty".into()));
        }

        self.ensure_writable()?;

        let (offset, length) = self.log.append(key, &[])?;
        self.index.delete(key);
        self.metrics.record_delete(length);
        log::debug!("tombstone for {} byte key at offset {}", key.len(), offset);
        Ok(())
    }

    /// Returns false when the opening replay stopped before end-of-file.
    pub fn is_writable(&self) -> bool {
        self.recovery.is_clean()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.is_writable() {
            return Ok(());
        }
        Err(StoreError::ReadOnly {
            valid_len: self.recovery.valid_len,
            discarded: self.recovery.discarded_bytes(),
        })
    }

    /// Returns true if `key` currently has a live value.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.index.contains_key(key)
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Live keys, sorted.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.index.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Current size of the log file in bytes.
    pub fn log_size(&self) -> u64 {
        self.log.len()
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// What the replay at open found.
    pub fn recovery(&self) -> &ReplayReport {
        &self.recovery
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sync the log file to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.log.sync()
    }

    /// Sync and release the log file.
    pub fn close(mut self) -> Result<()> {
        self.log.sync()?;
        log::info!("kvlog store at {:?} closed", self.config.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(dir: &Path) -> Config {
        Config::new(dir.join("store.log")).with_sync_writes(false)
    }

    #[test]
    fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open_with_config(temp_config(dir.path())).unwrap();

        store.put(b"a", b"1").unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));

        store.delete(b"a").unwrap();
        assert_eq!(store.get(b"a").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_empty_key_and_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open_with_config(temp_config(dir.path())).unwrap();

        assert!(matches!(store.put(b"", b"v"), Err(StoreError::InvalidArgument(_))));
        assert!(matches!(store.put(b"k", b""), Err(StoreError::InvalidArgument(_))));
        assert!(matches!(store.delete(b""), Err(StoreError::InvalidArgument(_))));
        assert_eq!(store.log_size(), 0);
    }

    #[test]
    fn test_delete_missing_key_appends_tombstone() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open_with_config(temp_config(dir.path())).unwrap();

        store.delete(b"never").unwrap();
        assert_eq!(store.log_size(), codec::encoded_len(5, 0) as u64);
        assert_eq!(store.get(b"never").unwrap(), None);
    }

    #[test]
    fn test_index_tracks_latest_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open_with_config(temp_config(dir.path())).unwrap();

        store.put(b"k", b"v1").unwrap();
        let first = store.index.get(b"k").unwrap();
        store.put(b"k", b"v2").unwrap();
        let second = store.index.get(b"k").unwrap();

        assert_eq!(second.offset, first.offset + first.length as u64);
        assert_eq!(store.log_size(), second.offset + second.length as u64);
        assert_eq!(store.get(b"k").unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn test_key_mismatch_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open_with_config(temp_config(dir.path())).unwrap();

        store.put(b"real", b"value").unwrap();
        let entry = store.index.get(b"real").unwrap();
        store.index.set(b"alias".to_vec(), entry.offset, entry.length);

        assert_eq!(store.get(b"alias").unwrap(), None);
        assert_eq!(store.get(b"real").unwrap(), Some(b"value".to_vec()));
    }

    #[test]
    fn test_metrics_follow_operations() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open_with_config(temp_config(dir.path())).unwrap();

        store.put(b"k", b"v").unwrap();
        store.get(b"k").unwrap();
        store.get(b"missing").unwrap();
        store.delete(b"k").unwrap();

        let m = store.metrics();
        assert_eq!(m.total_ops(), 4);
        assert_eq!(
            m.bytes_appended.load(std::sync::atomic::Ordering::Relaxed),
            store.log_size()
        );
    }

    #[test]
    fn test_close_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());
        {
            let mut store = Store::open_with_config(config.clone()).unwrap();
            store.put(b"k", b"v").unwrap();
            store.close().unwrap();
        }
        let mut store = Store::open_with_config(config).unwrap();
        assert_eq!(store.recovery().records, 1);
        assert!(store.recovery().is_clean());
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
    }
}
