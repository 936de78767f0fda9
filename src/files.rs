//! Data-directory file naming and scanning
//!
//! Journal and segment files are named by zero-padded monotonic ids in two
//! independent id spaces. The scan helpers return paths sorted ascending
//! by id, which recovery and id seeding rely on.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// First id assigned in an empty directory, for journals and segments alike
pub const FILE_START_ID: u64 = 1;

const SEGMENT_PREFIX: &str = "segment_";
const JOURNAL_PREFIX: &str = "journal_";
const SEGMENT_DATA_EXT: &str = "sst";
const SEGMENT_INDEX_EXT: &str = "idx";
const JOURNAL_EXT: &str = "wal";

/// Path of a segment data file: `segment_000042.sst`
pub fn segment_data_path(dir: &Path, id: u64) -> PathBuf {
    dir.join(format!("{}{:06}.{}", SEGMENT_PREFIX, id, SEGMENT_DATA_EXT))
}

/// Path of a segment index file: `segment_000042.idx`
pub fn segment_index_path(dir: &Path, id: u64) -> PathBuf {
    dir.join(format!("{}{:06}.{}", SEGMENT_PREFIX, id, SEGMENT_INDEX_EXT))
}

/// Path of a journal segment file: `journal_000042.wal`
pub fn journal_path(dir: &Path, id: u64) -> PathBuf {
    dir.join(format!("{}{:06}.{}", JOURNAL_PREFIX, id, JOURNAL_EXT))
}

/// Parse the id out of a journal or segment file name.
/// `segment_000042.sst` → `Some(42)`
pub fn file_id(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_string_lossy();
    let id = stem
        .strip_prefix(SEGMENT_PREFIX)
        .or_else(|| stem.strip_prefix(JOURNAL_PREFIX))?;
    id.parse().ok()
}

/// All segment data files in `dir`, ascending by id
pub fn list_segment_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_by_extension(dir, SEGMENT_DATA_EXT)
}

/// All journal segment files in `dir`, ascending by id
pub fn list_journal_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_by_extension(dir, JOURNAL_EXT)
}

/// Delete every journal segment file in `dir`
pub fn remove_journal_files(dir: &Path) -> Result<()> {
    for path in list_journal_files(dir)? {
        fs::remove_file(path)?;
    }
    Ok(())
}

fn list_by_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut found: Vec<(u64, PathBuf)> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().map_or(true, |e| e != ext) {
            continue;
        }
        if let Some(id) = file_id(&path) {
            found.push((id, path));
        }
    }

    found.sort_by_key(|(id, _)| *id);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}
