//! Segment manager
//!
//! Holds every open segment reader and exposes a merged read view over
//! them. Each time a generation is added, a fresh immutable view is
//! published, so a read that grabbed the previous view keeps a complete,
//! consistent snapshot while the flush worker registers new segments.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

use super::SegmentReader;

/// Immutable snapshot of all generations at one point in time.
///
/// Readers are ordered oldest first; lookups scan newest to oldest and
/// return the first match, so the most recent generation wins.
pub struct SegmentView {
    readers: Vec<Arc<SegmentReader>>,
}

impl SegmentView {
    fn empty() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Merged lookup, newest generation first.
    ///
    /// The first segment whose index contains the key decides the answer,
    /// even when its stored value is empty or a tombstone marker; older
    /// generations must not leak through.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        for reader in self.readers.iter().rev() {
            if reader.contains(key) {
                return reader.get(key);
            }
        }
        Ok(None)
    }

    /// Merged membership check, newest generation first
    pub fn contains(&self, key: &[u8]) -> bool {
        self.readers.iter().rev().any(|reader| reader.contains(key))
    }

    /// Number of generations in this snapshot
    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

/// Manages the ordered list of segment generations
pub struct SegmentManager {
    view: RwLock<Arc<SegmentView>>,
}

impl Default for SegmentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentManager {
    pub fn new() -> Self {
        Self {
            view: RwLock::new(Arc::new(SegmentView::empty())),
        }
    }

    /// Register a newly created (or rediscovered) generation.
    ///
    /// Callers must add generations in ascending id order; the merged view
    /// treats the most recently added as the newest.
    pub fn add_reader(&self, reader: SegmentReader) {
        let mut guard = self.view.write();
        let mut readers = guard.readers.clone();
        readers.push(Arc::new(reader));
        *guard = Arc::new(SegmentView { readers });
    }

    /// Current immutable snapshot of all generations
    pub fn view(&self) -> Arc<SegmentView> {
        self.view.read().clone()
    }

    /// Merged lookup against the current snapshot
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.view().get(key)
    }

    /// Number of registered generations
    pub fn segment_count(&self) -> usize {
        self.view.read().len()
    }
}
