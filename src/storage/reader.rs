//! Segment reader
//!
//! Opens one segment generation and serves point lookups: the index file
//! is loaded fully into an in-memory ordered map at open time, and a hit
//! seeks to the recorded offset in the data file.

use std::path::Path;
use std::str;

use parking_lot::Mutex;

use crate::error::{EmberError, Result};
use crate::files;
use crate::logfile::LogReader;
use crate::record::{KvCodec, ValueCodec};
use crate::tree::BsTree;

/// Read-only handle to one segment generation
pub struct SegmentReader {
    id: u64,
    /// key → byte offset in the data file
    index: BsTree<u64>,
    /// Interior mutability: lookups seek the data file, so the reader is
    /// shared behind a Mutex and `get` takes `&self`.
    data: Mutex<LogReader<ValueCodec>>,
}

impl SegmentReader {
    /// Open segment `id`, loading its index into memory
    pub fn open(dir: &Path, id: u64) -> Result<Self> {
        let index_reader = LogReader::<KvCodec>::open(&files::segment_index_path(dir, id))?;

        let mut index = BsTree::new();
        for record in index_reader.into_records() {
            let record = record?;
            let offset = parse_offset(&record.value)?;
            index.insert(record.key, offset);
        }

        let data = LogReader::open(&files::segment_data_path(dir, id))?;

        Ok(Self {
            id,
            index,
            data: Mutex::new(data),
        })
    }

    /// Look up a key. `Ok(None)` means the key is not in this segment.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let offset = match self.index.get(key) {
            Some(&offset) => offset,
            None => return Ok(None),
        };
        let record = self.data.lock().read_at(offset)?;
        Ok(Some(record.value))
    }

    /// Index-only membership check; no data-file access
    pub fn contains(&self, key: &[u8]) -> bool {
        self.index.contains(key)
    }

    /// Generation id of this segment
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of keys in this segment
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn parse_offset(raw: &[u8]) -> Result<u64> {
    str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| {
            EmberError::Corruption(format!("invalid index offset {:?}", raw))
        })
}
