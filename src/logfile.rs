//! Append-only file abstraction
//!
//! Wraps a single file opened either write-append or read-only, with the
//! record codec applied at the boundary. Writers track the byte offset at
//! which each record begins; readers decode either at a given offset or
//! sequentially from the start.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::config::SyncPolicy;
use crate::error::{EmberError, Result};
use crate::record::RecordCodec;

// =============================================================================
// LogWriter
// =============================================================================

/// Append-only writer for one record-formatted file
pub struct LogWriter<C: RecordCodec> {
    file: File,
    path: PathBuf,
    offset: u64,
    sync: SyncPolicy,
    appends_since_sync: usize,
    _codec: PhantomData<C>,
}

impl<C: RecordCodec> LogWriter<C> {
    /// Open (or create) a file in append mode
    pub fn open(path: &Path, sync: SyncPolicy) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            file,
            path: path.to_path_buf(),
            offset,
            sync,
            appends_since_sync: 0,
            _codec: PhantomData,
        })
    }

    /// Append one record and return the byte offset at which it begins.
    ///
    /// Callers use the returned offset as a foreign key (segment index
    /// entries store it).
    pub fn append(&mut self, record: &C::Record) -> Result<u64> {
        let start = self.offset;
        let encoded = C::encode(record);
        self.file.write_all(&encoded)?;
        self.file.flush()?;
        self.offset += encoded.len() as u64;

        self.appends_since_sync += 1;
        match self.sync {
            SyncPolicy::EveryWrite => self.sync()?,
            SyncPolicy::EveryNWrites { count } => {
                if self.appends_since_sync >= count {
                    self.sync()?;
                }
            }
            SyncPolicy::Manual => {}
        }

        Ok(start)
    }

    /// Force an OS-level durability sync
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        self.appends_since_sync = 0;
        Ok(())
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the file in bytes
    pub fn size(&self) -> u64 {
        self.offset
    }
}

// =============================================================================
// LogReader
// =============================================================================

/// Read-only access to one record-formatted file
pub struct LogReader<C: RecordCodec> {
    file: BufReader<File>,
    path: PathBuf,
    _codec: PhantomData<C>,
}

impl<C: RecordCodec> LogReader<C> {
    /// Open an existing file for reading.
    ///
    /// Fails with an I/O error if the file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            file: BufReader::new(file),
            path: path.to_path_buf(),
            _codec: PhantomData,
        })
    }

    /// Decode the single record starting at `offset`, verifying its checksum
    pub fn read_at(&mut self, offset: u64) -> Result<C::Record> {
        self.file.seek(SeekFrom::Start(offset))?;
        match C::decode(&mut self.file)? {
            Some(record) => Ok(record),
            None => Err(EmberError::Corruption(format!(
                "no record at offset {} in {}",
                offset,
                self.path.display()
            ))),
        }
    }

    /// Consume the reader into a lazy sequential iterator over all records.
    ///
    /// The sequence is finite and non-restartable: it stops cleanly at
    /// end-of-file and yields a corruption error for a truncated trailing
    /// record or a checksum mismatch.
    pub fn into_records(mut self) -> Records<C> {
        // decode from the start regardless of prior read_at position
        let rewound = self.file.seek(SeekFrom::Start(0)).is_ok();
        Records {
            file: self.file,
            done: !rewound,
            _codec: PhantomData,
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lazy iterator over the records of one file
pub struct Records<C: RecordCodec> {
    file: BufReader<File>,
    done: bool,
    _codec: PhantomData<C>,
}

impl<C: RecordCodec> Iterator for Records<C> {
    type Item = Result<C::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match C::decode(&mut self.file) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
