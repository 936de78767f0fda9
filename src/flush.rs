//! Flush pipeline
//!
//! A single background worker consumes retired buffers from an unbounded
//! FIFO queue, strictly one at a time. That gives three guarantees: at
//! most one flush in flight, segment generation ids assigned in enqueue
//! order, and no two flushes racing on file creation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;

use crate::error::Result;
use crate::files;
use crate::memtable::MemTable;
use crate::storage::{SegmentManager, SegmentReader, SegmentWriter};

/// One unit of flush work: a retired buffer and the journal segment it was
/// filled from. Recovery-originated flushes carry no journal path; their
/// journal cleanup happens in bulk after replay completes.
pub struct FlushTask {
    pub buffer: Arc<MemTable>,
    pub journal: Option<PathBuf>,
}

/// Persists retired buffers as new segment generations
pub struct Flusher {
    dir: PathBuf,
    segments: Arc<SegmentManager>,
    next_segment_id: AtomicU64,
}

impl Flusher {
    pub fn new(dir: &Path, segments: Arc<SegmentManager>, next_segment_id: u64) -> Self {
        Self {
            dir: dir.to_path_buf(),
            segments,
            next_segment_id: AtomicU64::new(next_segment_id),
        }
    }

    /// Flush one task: allocate the next generation id, write the segment
    /// from the buffer's sorted contents, delete the superseded journal,
    /// and register the new reader.
    ///
    /// A part-way failure leaves the buffer un-flushed and the journal on
    /// disk; replay reconstructs the same data on the next startup.
    pub fn flush(&self, task: &FlushTask) -> Result<u64> {
        let id = self.next_segment_id.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            "flushing buffer ({} entries) to {}",
            task.buffer.len(),
            files::segment_data_path(&self.dir, id).display()
        );

        let mut writer = SegmentWriter::create(&self.dir, id)?;
        for (key, entry) in task.buffer.iter() {
            writer.append(key, entry.as_raw())?;
        }
        writer.finish()?;

        if let Some(journal) = &task.journal {
            tracing::debug!("deleting journal file {}", journal.display());
            fs::remove_file(journal)?;
        }

        let reader = SegmentReader::open(&self.dir, id)?;
        self.segments.add_reader(reader);
        Ok(id)
    }

    /// Start the background worker.
    ///
    /// The loop drains the queue in submission order and exits when every
    /// sender is gone. A failed task is logged and skipped; the worker
    /// never takes the process down with it.
    pub fn spawn(self: Arc<Self>, tasks: Receiver<FlushTask>) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("emberkv-flush".to_string())
            .spawn(move || {
                for task in tasks.iter() {
                    if let Err(e) = self.flush(&task) {
                        tracing::error!("background flush failed: {}", e);
                    }
                }
            })?;
        Ok(handle)
    }
}
