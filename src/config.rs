//! kvlog - Store Configuration
//! Defines where the log lives and how writes reach the disk.

use std::path::PathBuf;

/// Configuration for a kvlog store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the append-only log file. Created on first open.
    pub path: PathBuf,

    /// Whether to sync each append to disk before returning (fdatasync).
    pub sync_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.log"),
            sync_writes: true,
        }
    }
}

impl Config {
    /// Create a new Config for the log file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Enable or disable syncing after every append.
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Ensure the directory holding the log file exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.path, PathBuf::from("data.log"));
        assert!(config.sync_writes);
    }

    #[test]
    fn test_ensure_dirs_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().join("nested/deeper/data.log")).with_sync_writes(false);
        config.ensure_dirs().unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
        assert!(!config.sync_writes);
    }

    #[test]
    fn test_ensure_dirs_bare_file_name() {
        Config::new("data.log").ensure_dirs().unwrap();
    }
}
