//! Read/write buffer pair
//!
//! Exactly two buffers exist at any time: the active buffer receiving
//! writes and the retiring buffer being (or already) persisted. A role
//! swap is O(1): the active buffer is promoted to retiring and a fresh
//! empty buffer is installed.
//!
//! The retiring buffer is never cleared after its flush completes; it
//! remains queryable indefinitely. Segment reads below it return the same
//! answer once the flush has landed, so this costs memory, not
//! correctness.

use std::mem;
use std::sync::Arc;

use super::{MemTable, MemTableEntry};

/// The active/retiring buffer pair
pub struct BufferPair {
    active: MemTable,
    retiring: Arc<MemTable>,
}

impl Default for BufferPair {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPair {
    pub fn new() -> Self {
        Self {
            active: MemTable::new(),
            retiring: Arc::new(MemTable::new()),
        }
    }

    /// Writes only ever target the active buffer
    pub fn insert(&mut self, key: Vec<u8>, entry: MemTableEntry) {
        self.active.insert(key, entry);
    }

    /// Check the active buffer, then the retiring buffer.
    ///
    /// Presence is explicit: an entry found in the active buffer is
    /// returned even when it is a tombstone or an empty value, never
    /// falling through to the retiring buffer.
    pub fn get(&self, key: &[u8]) -> Option<&MemTableEntry> {
        match self.active.get(key) {
            Some(entry) => Some(entry),
            None => self.retiring.get(key),
        }
    }

    /// Number of entries in the active buffer (drives the flush threshold)
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn active_is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Promote the active buffer to retiring and install a fresh one.
    ///
    /// Returns a shared handle to the retired buffer for the flush
    /// pipeline; the pair keeps its own handle so reads continue to see
    /// the retired contents.
    pub fn swap(&mut self) -> Arc<MemTable> {
        let retired = Arc::new(mem::take(&mut self.active));
        self.retiring = Arc::clone(&retired);
        retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(v: &[u8]) -> MemTableEntry {
        MemTableEntry::Value(v.to_vec())
    }

    #[test]
    fn reads_check_active_then_retiring() {
        let mut pair = BufferPair::new();
        pair.insert(b"old".to_vec(), value(b"1"));
        pair.swap();
        pair.insert(b"new".to_vec(), value(b"2"));

        assert_eq!(pair.get(b"old"), Some(&value(b"1")));
        assert_eq!(pair.get(b"new"), Some(&value(b"2")));
        assert_eq!(pair.get(b"none"), None);
    }

    #[test]
    fn active_shadows_retiring() {
        let mut pair = BufferPair::new();
        pair.insert(b"k".to_vec(), value(b"old"));
        pair.swap();
        pair.insert(b"k".to_vec(), value(b"new"));

        assert_eq!(pair.get(b"k"), Some(&value(b"new")));
    }

    #[test]
    fn swap_keeps_keys_visible() {
        let mut pair = BufferPair::new();
        pair.insert(b"a".to_vec(), value(b"1"));
        pair.insert(b"b".to_vec(), value(b"2"));

        let retired = pair.swap();
        assert_eq!(retired.len(), 2);
        assert_eq!(pair.active_len(), 0);
        // still visible via the retiring role
        assert_eq!(pair.get(b"a"), Some(&value(b"1")));
        assert_eq!(pair.get(b"b"), Some(&value(b"2")));
    }

    #[test]
    fn tombstone_in_active_does_not_fall_through() {
        let mut pair = BufferPair::new();
        pair.insert(b"k".to_vec(), value(b"live"));
        pair.swap();
        pair.insert(b"k".to_vec(), MemTableEntry::Tombstone);

        assert_eq!(pair.get(b"k"), Some(&MemTableEntry::Tombstone));
    }

    #[test]
    fn empty_value_is_present() {
        let mut pair = BufferPair::new();
        pair.insert(b"e".to_vec(), value(b"fallback"));
        pair.swap();
        pair.insert(b"e".to_vec(), value(b""));

        assert_eq!(pair.get(b"e"), Some(&value(b"")));
    }
}
