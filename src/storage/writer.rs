//! Segment writer
//!
//! Persists a retired buffer's sorted contents as a new generation: values
//! into the data file and (key, offset) pairs into the index file, in
//! lock-step.

use std::path::Path;

use crate::config::SyncPolicy;
use crate::error::Result;
use crate::files;
use crate::logfile::LogWriter;
use crate::record::{KvCodec, KvRecord, ValueCodec, ValueRecord};

/// Writer for one new segment generation
pub struct SegmentWriter {
    data: LogWriter<ValueCodec>,
    index: LogWriter<KvCodec>,
}

impl SegmentWriter {
    /// Create the data and index files for segment `id`
    pub fn create(dir: &Path, id: u64) -> Result<Self> {
        // synced once in finish(); the journal covers the data until then
        let data = LogWriter::open(&files::segment_data_path(dir, id), SyncPolicy::Manual)?;
        let index = LogWriter::open(&files::segment_index_path(dir, id), SyncPolicy::Manual)?;
        Ok(Self { data, index })
    }

    /// Append one pair. Must be called in ascending key order.
    pub fn append(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let offset = self.data.append(&ValueRecord {
            value: value.to_vec(),
        })?;
        self.index.append(&KvRecord {
            key: key.to_vec(),
            value: offset.to_string().into_bytes(),
        })?;
        Ok(())
    }

    /// Sync both files; the segment is durable and immutable afterwards
    pub fn finish(mut self) -> Result<()> {
        self.data.sync()?;
        self.index.sync()?;
        Ok(())
    }
}
