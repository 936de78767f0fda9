//! Segment (SSTable) Module
//!
//! Immutable on-disk generations of sorted key-value data.
//!
//! ## File Format
//! ```text
//! segment_NNNNNN.sst (data file, append order = key order)
//! ┌─────────┬─────────┬───────┐
//! │ CRC (4) │ VLen(4) │ Value │  ... repeated ...
//! └─────────┴─────────┴───────┘
//!
//! segment_NNNNNN.idx (index file, same order)
//! ┌─────────┬─────────┬─────────┬─────┬────────────────────┐
//! │ CRC (4) │ KLen(4) │ VLen(4) │ Key │ Offset (decimal)   │
//! └─────────┴─────────┴─────────┴─────┴────────────────────┘
//! ```
//!
//! Each index record maps a key to the byte offset of its value record in
//! the data file, stored as a decimal string. A segment is never mutated
//! after `finish()`; readers load the whole index into memory at open.

mod manager;
mod reader;
mod writer;

pub use manager::{SegmentManager, SegmentView};
pub use reader::SegmentReader;
pub use writer::SegmentWriter;
