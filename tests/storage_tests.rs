//! Tests for the segment writer, reader, and manager
//!
//! These tests verify:
//! - Segment creation from sorted pairs and point lookups
//! - Index-only `contains` checks
//! - Newest-wins merging across generations
//! - Immutable view snapshots while generations are added
//! - Error surfacing for missing files

use std::path::Path;

use emberkv::storage::{SegmentManager, SegmentReader, SegmentWriter};
use emberkv::EmberError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Write one segment from pairs already in ascending key order
fn write_segment(dir: &Path, id: u64, pairs: &[(&str, &str)]) {
    let mut writer = SegmentWriter::create(dir, id).unwrap();
    for (key, value) in pairs {
        writer.append(key.as_bytes(), value.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

// =============================================================================
// Writer / Reader Tests
// =============================================================================

#[test]
fn test_write_then_read_back() {
    let temp = TempDir::new().unwrap();
    write_segment(temp.path(), 1, &[("apple", "1"), ("banana", "2"), ("cherry", "3")]);

    let reader = SegmentReader::open(temp.path(), 1).unwrap();
    assert_eq!(reader.len(), 3);
    assert_eq!(reader.get(b"apple").unwrap(), Some(b"1".to_vec()));
    assert_eq!(reader.get(b"banana").unwrap(), Some(b"2".to_vec()));
    assert_eq!(reader.get(b"cherry").unwrap(), Some(b"3".to_vec()));
}

#[test]
fn test_get_absent_key_is_none() {
    let temp = TempDir::new().unwrap();
    write_segment(temp.path(), 1, &[("b", "2")]);

    let reader = SegmentReader::open(temp.path(), 1).unwrap();
    assert_eq!(reader.get(b"a").unwrap(), None);
    assert_eq!(reader.get(b"c").unwrap(), None);
}

#[test]
fn test_contains_uses_index_only() {
    let temp = TempDir::new().unwrap();
    write_segment(temp.path(), 1, &[("k1", "v1"), ("k2", "v2")]);

    let reader = SegmentReader::open(temp.path(), 1).unwrap();
    assert!(reader.contains(b"k1"));
    assert!(reader.contains(b"k2"));
    assert!(!reader.contains(b"k3"));
}

#[test]
fn test_empty_value_is_stored_and_returned() {
    let temp = TempDir::new().unwrap();
    write_segment(temp.path(), 1, &[("empty", ""), ("full", "x")]);

    let reader = SegmentReader::open(temp.path(), 1).unwrap();
    assert_eq!(reader.get(b"empty").unwrap(), Some(Vec::new()));
    assert!(reader.contains(b"empty"));
}

#[test]
fn test_random_access_across_many_entries() {
    let temp = TempDir::new().unwrap();
    let pairs: Vec<(String, String)> = (0..500)
        .map(|i| (format!("key{:05}", i), format!("value{}", i)))
        .collect();
    let mut writer = SegmentWriter::create(temp.path(), 7).unwrap();
    for (key, value) in &pairs {
        writer.append(key.as_bytes(), value.as_bytes()).unwrap();
    }
    writer.finish().unwrap();

    let reader = SegmentReader::open(temp.path(), 7).unwrap();
    assert_eq!(reader.id(), 7);
    for i in [499, 0, 250, 42, 137] {
        let value = reader.get(format!("key{:05}", i).as_bytes()).unwrap();
        assert_eq!(value, Some(format!("value{}", i).into_bytes()));
    }
}

#[test]
fn test_open_missing_segment_is_io_error() {
    let temp = TempDir::new().unwrap();

    let result = SegmentReader::open(temp.path(), 1);
    assert!(matches!(result, Err(EmberError::Io(_))));
}

// =============================================================================
// Manager Tests
// =============================================================================

#[test]
fn test_newest_generation_wins() {
    let temp = TempDir::new().unwrap();
    write_segment(temp.path(), 1, &[("k", "old"), ("only-old", "1")]);
    write_segment(temp.path(), 2, &[("k", "new"), ("only-new", "2")]);

    let manager = SegmentManager::new();
    manager.add_reader(SegmentReader::open(temp.path(), 1).unwrap());
    manager.add_reader(SegmentReader::open(temp.path(), 2).unwrap());

    assert_eq!(manager.get(b"k").unwrap(), Some(b"new".to_vec()));
    assert_eq!(manager.get(b"only-old").unwrap(), Some(b"1".to_vec()));
    assert_eq!(manager.get(b"only-new").unwrap(), Some(b"2".to_vec()));
    assert_eq!(manager.get(b"missing").unwrap(), None);
}

#[test]
fn test_empty_value_in_newer_generation_shadows_older() {
    let temp = TempDir::new().unwrap();
    write_segment(temp.path(), 1, &[("e", "fallback")]);
    write_segment(temp.path(), 2, &[("e", "")]);

    let manager = SegmentManager::new();
    manager.add_reader(SegmentReader::open(temp.path(), 1).unwrap());
    manager.add_reader(SegmentReader::open(temp.path(), 2).unwrap());

    // presence in the newer generation decides, even for an empty value
    assert_eq!(manager.get(b"e").unwrap(), Some(Vec::new()));
}

#[test]
fn test_view_is_a_consistent_snapshot() {
    let temp = TempDir::new().unwrap();
    write_segment(temp.path(), 1, &[("a", "1")]);
    write_segment(temp.path(), 2, &[("b", "2")]);

    let manager = SegmentManager::new();
    manager.add_reader(SegmentReader::open(temp.path(), 1).unwrap());

    let view = manager.view();
    manager.add_reader(SegmentReader::open(temp.path(), 2).unwrap());

    // an in-flight read keeps the list it started with
    assert_eq!(view.len(), 1);
    assert!(!view.contains(b"b"));
    assert_eq!(manager.segment_count(), 2);
    assert!(manager.view().contains(b"b"));
}

#[test]
fn test_empty_manager_finds_nothing() {
    let manager = SegmentManager::new();
    assert_eq!(manager.get(b"anything").unwrap(), None);
    assert_eq!(manager.segment_count(), 0);
}
