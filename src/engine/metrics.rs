//! kvlog - Store Metrics
//! Atomic operation counters for runtime introspection of a store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Atomic operation counters for a kvlog store.
///
/// All counters use `Ordering::Relaxed`; they are read for reporting only.
#[derive(Debug)]
pub struct StoreMetrics {
    /// Total number of `put` operations.
    pub puts: AtomicU64,
    /// Total number of `get` operations.
    pub gets: AtomicU64,
    /// `get` calls that returned a value.
    pub hits: AtomicU64,
    /// `get` calls that found no live key.
    pub misses: AtomicU64,
    /// Total number of `delete` operations.
    pub deletes: AtomicU64,
    /// Encoded bytes appended to the log.
    pub bytes_appended: AtomicU64,
    /// Value bytes returned by `get`.
    pub bytes_read: AtomicU64,
    /// `get` calls that returned an error.
    pub failed_gets: AtomicU64,
    /// Point reads that failed the checksum.
    pub corrupt_reads: AtomicU64,
    /// Records folded during the opening replay.
    pub records_replayed: AtomicU64,
    opened_at: Instant,
}

impl StoreMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self {
            puts: AtomicU64::new(0),
            gets: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            bytes_appended: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            failed_gets: AtomicU64::new(0),
            corrupt_reads: AtomicU64::new(0),
            records_replayed: AtomicU64::new(0),
            opened_at: Instant::now(),
        }
    }

    /// Record a put that appended `encoded_len` bytes.
    pub fn record_put(&self, encoded_len: usize) {
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.bytes_appended
            .fetch_add(encoded_len as u64, Ordering::Relaxed);
    }

    /// Record a get; `value_size` is `None` on a miss.
    pub fn record_get(&self, value_size: Option<usize>) {
        self.gets.fetch_add(1, Ordering::Relaxed);
        match value_size {
            Some(size) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.bytes_read.fetch_add(size as u64, Ordering::Relaxed);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record a delete that appended a tombstone of `encoded_len` bytes.
    pub fn record_delete(&self, encoded_len: usize) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.bytes_appended
            .fetch_add(encoded_len as u64, Ordering::Relaxed);
    }

    /// Record a get that failed; `corrupt` marks a checksum failure.
    pub fn record_failed_get(&self, corrupt: bool) {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.failed_gets.fetch_add(1, Ordering::Relaxed);
        if corrupt {
            self.corrupt_reads.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_replay(&self, records: usize) {
        self.records_replayed
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    /// Seconds since the store was opened.
    pub fn uptime_secs(&self) -> f64 {
        self.opened_at.elapsed().as_secs_f64()
    }

    /// Get total number of operations (puts + gets + deletes).
    pub fn total_ops(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
            + self.gets.load(Ordering::Relaxed)
            + self.deletes.load(Ordering::Relaxed)
    }

    /// Format metrics as a human-readable report.
    pub fn report(&self) -> String {
        format!(
            "\n=== kvlog Store Metrics ===\n\
             Operations:\n\
               puts:      {}\n\
               gets:      {} ({} hits, {} misses, {} failed)\n\
               deletes:   {}\n\
             I/O:\n\
               appended:  {} bytes\n\
               read:      {} bytes\n\
             Integrity:\n\
               corrupt reads:    {}\n\
               records replayed: {}\n\
             Uptime: {:.2}s",
            self.puts.load(Ordering::Relaxed),
            self.gets.load(Ordering::Relaxed),
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.failed_gets.load(Ordering::Relaxed),
            self.deletes.load(Ordering::Relaxed),
            self.bytes_appended.load(Ordering::Relaxed),
            self.bytes_read.load(Ordering::Relaxed),
            self.corrupt_reads.load(Ordering::Relaxed),
            self.records_replayed.load(Ordering::Relaxed),
            self.uptime_secs(),
        )
    }
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}
