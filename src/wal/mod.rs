//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only journaling: every
//! accepted mutation is written to the active journal segment before it is
//! applied to the write buffer, so nothing is visible in memory that is
//! not durable on disk.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Record 1                                    │
//! │ ┌─────────┬─────────┬─────────┬─────┬─────┐ │
//! │ │ CRC (4) │ KLen(4) │ VLen(4) │ Key │ Val │ │
//! │ └─────────┴─────────┴─────────┴─────┴─────┘ │
//! ├─────────────────────────────────────────────┤
//! │ Record 2                                    │
//! │ ...                                         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Journal segments rotate by entry count; a rotated segment stays on disk
//! until the flush pipeline has persisted the buffer it covers.

mod manager;

pub use manager::{Replay, WalManager};
