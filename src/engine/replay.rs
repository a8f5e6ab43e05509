//! kvlog - Log Replay
//! Rebuilds the in-memory index by folding every record of the log, in file
//! order, from offset 0.
//!
//! ## Recovery Policy
//! A checksum failure or a short record stops the replay. Everything before
//! that point is kept and everything after it is ignored (but left on disk).
//! Records after a mid-log corruption are lost to the index; the stop is
//! reported through `ReplayReport` and logged as a warning. A store opened
//! from such a log refuses writes, since nothing appended after the stop
//! point could be replayed.

use crate::error::{Result, StoreError};

use super::append_log::AppendLog;
use super::index::Index;

/// Why the replay stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStop {
    /// Reached end-of-file on a record boundary.
    Clean,
    /// Checksum mismatch in the record starting at `offset`.
    Corrupt { offset: u64 },
    /// The record starting at `offset` runs past end-of-file.
    Truncated { offset: u64 },
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Records folded into the index, tombstones included.
    pub records: usize,
    /// Tombstones among `records`.
    pub tombstones: usize,
    /// Bytes of log covered by the folded records.
    pub valid_len: u64,
    /// Length of the log file when replay started.
    pub file_len: u64,
    pub stop: ReplayStop,
}

impl ReplayReport {
    /// Bytes after the stop point that did not contribute to the index.
    pub fn discarded_bytes(&self) -> u64 {
        self.file_len.saturating_sub(self.valid_len)
    }

    pub fn is_clean(&self) -> bool {
        self.stop == ReplayStop::Clean
    }
}

/// Replay `log` from offset 0 into a fresh index.
///
/// Corrupt or truncated records end the replay without failing it. I/O
/// errors and framing mismatches are returned to the caller.
pub fn replay(log: &mut AppendLog) -> Result<(Index, ReplayReport)> {
    let file_len = log.len();
    let mut index = Index::new();
    let mut records = 0;
    let mut tombstones = 0;
    let mut offset: u64 = 0;

    let mut scanner = log.scan()?;
    let stop = loop {
        let (record, length) = match scanner.read_next() {
            Ok(Some(next)) => next,
            Ok(None) => break ReplayStop::Clean,
            Err(StoreError::CorruptRecord { stored, computed }) => {
                log::warn!(
                    "corrupted record at offset {} (stored crc {:#010x}, computed {:#010x})",
                    offset,
                    stored,
                    computed
                );
                break ReplayStop::Corrupt { offset };
            }
            Err(StoreError::Truncated { expected, found }) => {
                log::warn!(
                    "truncated record at offset {} (expected {} bytes, found {}), likely a torn write",
                    offset,
                    expected,
                    found
                );
                break ReplayStop::Truncated { offset };
            }
            Err(e) => return Err(e),
        };

        offset += length as u64;
        check_framing(offset, scanner.position()?)?;

        records += 1;
        if record.is_tombstone() {
            tombstones += 1;
            index.delete(&record.key);
        } else {
            index.set(record.key, offset - length as u64, length);
        }
    };

    let report = ReplayReport {
        records,
        tombstones,
        valid_len: offset,
        file_len,
        stop,
    };
    if !report.is_clean() {
        log::warn!(
            "replay of {:?} stopped early: ignoring {} bytes after offset {}",
            log.path(),
            report.discarded_bytes(),
            offset
        );
    }

    Ok((index, report))
}

/// The running sum of record lengths must match the file cursor after
/// every record.
fn check_framing(computed: u64, actual: u64) -> Result<()> {
    if computed != actual {
        return Err(StoreError::FramingMismatch { computed, actual });
    }
    Ok(())
}
