//! Configuration for EmberKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for an EmberKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files.
    /// Internal layout:
    ///   {data_dir}/
    ///     ├── journal_NNNNNN.wal   (write-ahead log segments)
    ///     ├── segment_NNNNNN.sst   (segment data files)
    ///     └── segment_NNNNNN.idx   (segment index files)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Buffer Configuration
    // -------------------------------------------------------------------------
    /// Max number of entries in the active buffer before it is retired
    /// and handed to the flush pipeline
    pub buffer_entry_limit: usize,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Max entries per journal segment before a new one is started
    pub wal_max_entries: usize,

    /// Sync policy for journal appends
    pub wal_sync: SyncPolicy,
}

/// Durability sync policy for append-only files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after N appends (balanced durability/performance)
    EveryNWrites { count: usize },

    /// fsync only on an explicit `sync()` call
    Manual,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./emberkv_data"),
            buffer_entry_limit: 4096,
            wal_max_entries: 5000,
            wal_sync: SyncPolicy::EveryWrite,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the active-buffer entry limit
    pub fn buffer_entry_limit(mut self, limit: usize) -> Self {
        self.config.buffer_entry_limit = limit;
        self
    }

    /// Set the max entries per journal segment
    pub fn wal_max_entries(mut self, limit: usize) -> Self {
        self.config.wal_max_entries = limit;
        self
    }

    /// Set the journal sync policy
    pub fn wal_sync(mut self, policy: SyncPolicy) -> Self {
        self.config.wal_sync = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
