//! kvlog - Append Log
//! Byte-addressable, append-only storage for encoded records.
//! The log file is the sole durable source of truth for the store.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::types::Record;

use super::codec::{self, HEADER_SIZE};

/// Append-only log file with offset addressing.
///
/// Records are written at end-of-file in one contiguous write and never
/// modified afterwards. Existing content is never truncated.
pub struct AppendLog {
    /// Path to the log file on disk.
    path: PathBuf,
    /// Exclusively owned handle, opened for reading and writing.
    file: File,
    /// Length of the log in bytes as of the last append or open.
    len: u64,
    /// Whether to fdatasync after each append.
    sync_writes: bool,
}

impl AppendLog {
    /// Open the log file at `path`, creating an empty one if it does not exist.
    pub fn open(path: impl AsRef<Path>, sync_writes: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path,
            file,
            len,
            sync_writes,
        })
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the length of the log in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if the log holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one record and return `(offset, length)` of its encoded form.
    ///
    /// The offset is the file length immediately before the write.
    pub fn append(&mut self, key: &[u8], value: &[u8]) -> Result<(u64, usize)> {
        let encoded = codec::encode(key, value)?;
        let offset = self.file.seek(SeekFrom::End(0))?;
        if offset != self.len {
            log::warn!(
                "log {:?} changed length outside this handle ({} -> {} bytes)",
                self.path,
                self.len,
                offset
            );
        }

        self.file.write_all(&encoded)?;
        if self.sync_writes {
            self.file.sync_data()?;
        }
        self.len = offset + encoded.len() as u64;

        log::debug!("appended {} bytes at offset {}", encoded.len(), offset);
        Ok((offset, encoded.len()))
    }

    /// Read and verify the record starting at `offset`.
    ///
    /// `offset` must be a record boundary previously returned by `append`
    /// or by a scan. Reaching end-of-file before a complete record is
    /// reported as `StoreError::Truncated`.
    pub fn read_at(&mut self, offset: u64) -> Result<Record> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(&mut self.file);
        codec::decode(&mut reader)?.ok_or(StoreError::Truncated {
            expected: HEADER_SIZE as u64,
            found: 0,
        })
    }

    /// Start a sequential scan of the log from offset 0.
    pub fn scan(&mut self) -> Result<LogScanner<'_>> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(LogScanner {
            reader: BufReader::new(&mut self.file),
        })
    }

    /// Flush and sync the log file to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

/// Sequential reader over the log, used for full-log replay.
pub struct LogScanner<'a> {
    reader: BufReader<&'a mut File>,
}

impl LogScanner<'_> {
    /// Read the record at the cursor and advance past it.
    ///
    /// Returns the record with its encoded length, or `Ok(None)` when no
    /// bytes remain (clean end of log).
    pub fn read_next(&mut self) -> Result<Option<(Record, usize)>> {
        Ok(codec::decode(&mut self.reader)?.map(|record| {
            let len = record.encoded_len();
            (record, len)
        }))
    }

    /// Byte position of the cursor as reported by the file layer.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.reader.stream_position()?)
    }
}
