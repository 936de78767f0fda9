//! WAL manager
//!
//! Owns the active journal segment, rotates it by entry count, and replays
//! every journal segment on disk in write order during recovery.

use std::path::{Path, PathBuf};

use crate::config::SyncPolicy;
use crate::error::Result;
use crate::files;
use crate::logfile::{LogReader, LogWriter, Records};
use crate::record::{KvCodec, KvRecord};

/// Manages journal segments in one data directory
pub struct WalManager {
    dir: PathBuf,
    active: Option<LogWriter<KvCodec>>,
    next_id: u64,
    max_entries: usize,
    current_entries: usize,
    sync: SyncPolicy,
}

impl WalManager {
    /// Open a manager over `dir`.
    ///
    /// The next segment id is seeded from the highest journal id already
    /// on disk, plus one. The first segment file is created lazily on the
    /// first append.
    pub fn open(dir: &Path, max_entries: usize, sync: SyncPolicy) -> Result<Self> {
        let journals = files::list_journal_files(dir)?;
        let next_id = journals
            .last()
            .and_then(|path| files::file_id(path))
            .map(|id| id + 1)
            .unwrap_or(files::FILE_START_ID);

        Ok(Self {
            dir: dir.to_path_buf(),
            active: None,
            next_id,
            max_entries,
            current_entries: 0,
            sync,
        })
    }

    /// Journal one mutation, rotating first if the active segment is full.
    ///
    /// Returns the byte offset the record was written at within the active
    /// segment.
    pub fn append(&mut self, key: &[u8], value: &[u8]) -> Result<u64> {
        if self.active.is_none() {
            self.create_active()?;
        } else if self.current_entries + 1 > self.max_entries {
            self.rotate_files()?;
        }
        self.current_entries += 1;

        let record = KvRecord {
            key: key.to_vec(),
            value: value.to_vec(),
        };
        // active is always Some here
        match self.active.as_mut() {
            Some(writer) => writer.append(&record),
            None => unreachable!("active journal created above"),
        }
    }

    /// Close the active segment and return its path without deleting it.
    ///
    /// Deleting the file is the flush pipeline's responsibility, once the
    /// buffer it covers has been persisted.
    pub fn rotate(&mut self) -> Result<PathBuf> {
        if self.active.is_none() {
            self.create_active()?;
        }
        let path = match self.active.as_ref() {
            Some(writer) => writer.path().to_path_buf(),
            None => unreachable!("active journal created above"),
        };
        self.rotate_files()?;
        Ok(path)
    }

    /// Lazily yield all records of all journal segments on disk, ascending
    /// by segment id, in file order within each segment. This reproduces
    /// the original write order across rotations.
    pub fn replay(&self) -> Result<Replay> {
        let journals = files::list_journal_files(&self.dir)?;
        if journals.is_empty() {
            tracing::debug!("no journal files found in {}", self.dir.display());
        }
        Ok(Replay {
            files: journals.into_iter(),
            current: None,
        })
    }

    /// Entry count of the active segment
    pub fn active_entries(&self) -> usize {
        self.current_entries
    }

    fn create_active(&mut self) -> Result<()> {
        let path = files::journal_path(&self.dir, self.next_id);
        self.active = Some(LogWriter::open(&path, self.sync)?);
        Ok(())
    }

    fn rotate_files(&mut self) -> Result<()> {
        self.next_id += 1;
        // dropping the writer closes the file
        self.active = None;
        self.current_entries = 0;
        self.create_active()
    }
}

/// Lazy iterator over all journal records in write order
pub struct Replay {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<Records<KvCodec>>,
}

impl Iterator for Replay {
    type Item = Result<KvRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(records) = self.current.as_mut() {
                match records.next() {
                    Some(item) => return Some(item),
                    None => self.current = None,
                }
            }
            let path = self.files.next()?;
            match LogReader::open(&path) {
                Ok(reader) => self.current = Some(reader.into_records()),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
