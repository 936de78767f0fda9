//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Journal every mutation before it becomes visible (write-ahead order)
//! - Apply writes to the active buffer and trigger role swaps
//! - Merge reads across buffers and segment generations, newest first
//! - Run crash recovery on startup

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use crossbeam::channel::{unbounded, Sender};

use crate::config::Config;
use crate::error::{EmberError, Result};
use crate::files;
use crate::flush::{FlushTask, Flusher};
use crate::memtable::{BufferPair, MemTableEntry, TOMBSTONE};
use crate::storage::{SegmentManager, SegmentReader};
use crate::wal::WalManager;

/// The main storage engine
///
/// ## Concurrency Model
///
/// - **put/get/delete**: serialized by one engine mutex. The critical
///   section covers the journal append, buffer mutation, threshold check,
///   and buffer-role swap: in-memory work plus a single journal append,
///   never a whole segment flush. Request latency is therefore bounded
///   independently of flush duration.
/// - **Flushing**: one long-lived background worker fed by an unbounded
///   queue; producers never block on it.
/// - **Segment list**: guarded by the segment manager's own lock, which
///   publishes immutable snapshots so reads and registration interleave
///   safely.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Mutable engine state (journal manager + buffer pair)
    inner: Mutex<Inner>,

    /// On-disk generations and their merged read view
    segments: Arc<SegmentManager>,

    /// Producer side of the flush queue
    flush_tx: Sender<FlushTask>,

    /// Background flush worker, joined by `close`
    worker: JoinHandle<()>,
}

/// State guarded by the engine mutex
struct Inner {
    wal: WalManager,
    buffers: BufferPair,
}

impl Engine {
    /// Open or create an engine with the given config.
    ///
    /// Recovery runs synchronously before this returns:
    /// 1. Open readers for every segment generation on disk
    /// 2. Replay all journal segments into the buffer, in write order
    /// 3. Flush replayed data to a fresh segment generation
    /// 4. Delete all journal files
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        // Step 1: rebuild segment readers, oldest first
        let segments = Arc::new(SegmentManager::new());
        let segment_files = files::list_segment_files(&config.data_dir)?;
        for path in &segment_files {
            if let Some(id) = files::file_id(path) {
                segments.add_reader(SegmentReader::open(&config.data_dir, id)?);
            }
        }

        // Step 2: seed the next generation id from the newest on disk
        let next_segment_id = segment_files
            .last()
            .and_then(|path| files::file_id(path))
            .map(|id| id + 1)
            .unwrap_or(files::FILE_START_ID);

        let flusher = Arc::new(Flusher::new(
            &config.data_dir,
            Arc::clone(&segments),
            next_segment_id,
        ));

        let wal = WalManager::open(&config.data_dir, config.wal_max_entries, config.wal_sync)?;

        // Step 3: replay journals; corruption aborts recovery here
        let mut buffers = BufferPair::new();
        let mut replayed = 0usize;
        for record in wal.replay()? {
            let record = record?;
            buffers.insert(record.key, MemTableEntry::from_raw(record.value));
            replayed += 1;
        }

        // Step 4: persist replayed data, then drop every journal file.
        // The flush carries no journal path; cleanup is bulk below.
        if !buffers.active_is_empty() {
            tracing::info!(
                "recovery: replayed {} records, flushing {} entries",
                replayed,
                buffers.active_len()
            );
            let retired = buffers.swap();
            flusher.flush(&FlushTask {
                buffer: retired,
                journal: None,
            })?;
        }
        files::remove_journal_files(&config.data_dir)?;

        // Step 5: start the background worker
        let (flush_tx, flush_rx) = unbounded();
        let worker = flusher.spawn(flush_rx)?;

        Ok(Self {
            config,
            inner: Mutex::new(Inner { wal, buffers }),
            segments,
            flush_tx,
            worker,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Put a key-value pair
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.write(key, value)
    }

    /// Delete a key by writing the reserved tombstone value, so the
    /// deletion shadows older generations on reads
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.write(key, TOMBSTONE)
    }

    fn write(&self, key: &[u8], raw_value: &[u8]) -> Result<()> {
        let mut inner = self.lock_inner()?;

        // Step 1: journal first (durability guarantee)
        inner.wal.append(key, raw_value)?;

        // Step 2: apply to the active buffer
        inner
            .buffers
            .insert(key.to_vec(), MemTableEntry::from_raw(raw_value.to_vec()));

        // Step 3: threshold check; rotation and swap are O(1), the
        // disk-heavy work happens on the flush worker
        if inner.buffers.active_len() + 1 > self.config.buffer_entry_limit {
            tracing::debug!(
                "active buffer reached {} entries (limit {}); retiring",
                inner.buffers.active_len(),
                self.config.buffer_entry_limit
            );
            let journal = inner.wal.rotate()?;
            let retired = inner.buffers.swap();
            self.flush_tx
                .send(FlushTask {
                    buffer: retired,
                    journal: Some(journal),
                })
                .map_err(|_| EmberError::Storage("flush worker disconnected".to_string()))?;
        }

        Ok(())
    }

    /// Get a value by key
    ///
    /// Search order:
    /// 1. Active buffer
    /// 2. Retiring buffer
    /// 3. Segment generations, newest to oldest
    ///
    /// Presence is explicit at every step: an empty value is a value, and
    /// a tombstone is "not found" without consulting anything older.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let inner = self.lock_inner()?;

        if let Some(entry) = inner.buffers.get(key) {
            return Ok(match entry {
                MemTableEntry::Value(value) => Some(value.clone()),
                MemTableEntry::Tombstone => None,
            });
        }

        match self.segments.get(key)? {
            Some(value) if value == TOMBSTONE => Ok(None),
            other => Ok(other),
        }
    }

    /// Close the engine, draining queued flushes.
    ///
    /// Unflushed buffer contents stay covered by their journal segments
    /// and are reconstructed by replay on the next open, so closing
    /// without calling this (or crashing) loses nothing.
    pub fn close(self) -> Result<()> {
        let Engine {
            inner,
            flush_tx,
            worker,
            ..
        } = self;
        // closes the active journal
        drop(inner);
        // disconnects the queue; the worker drains it and exits
        drop(flush_tx);
        worker
            .join()
            .map_err(|_| EmberError::Storage("flush worker panicked".to_string()))
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| EmberError::LockPoisoned(format!("engine lock poisoned: {}", e)))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Number of entries in the active buffer
    pub fn buffer_len(&self) -> Result<usize> {
        Ok(self.lock_inner()?.buffers.active_len())
    }

    /// Number of registered segment generations
    pub fn segment_count(&self) -> usize {
        self.segments.segment_count()
    }

    /// Paths of the journal segments currently on disk
    pub fn journal_files(&self) -> Result<Vec<PathBuf>> {
        files::list_journal_files(&self.config.data_dir)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
