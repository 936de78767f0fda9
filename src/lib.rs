//! # EmberKV
//!
//! An embedded, durable, log-structured key-value store with:
//! - Write-ahead journaling for durability
//! - An in-memory ordered buffer pair with O(1) role swap
//! - Immutable on-disk segment generations with sparse indexes
//! - Background flushing off the request path
//! - Crash recovery by journal replay
//!
//! ## Architecture Overview
//!
//! ```text
//!                    put/get
//!                       │
//! ┌─────────────────────▼───────────────────────┐
//! │                  Engine                      │
//! │            (single mutex, §put/get)          │
//! └──────┬───────────────┬───────────────────────┘
//!        │               │
//!        ▼               ▼
//! ┌─────────────┐ ┌─────────────┐   role swap   ┌─────────────┐
//! │   Journal   │ │   Active    │──────────────▶│  Retiring   │
//! │  (append)   │ │   Buffer    │               │   Buffer    │
//! └─────────────┘ └─────────────┘               └──────┬──────┘
//!                                                      │ flush queue
//!                                                      ▼
//!                                               ┌─────────────┐
//!                                               │  Segments   │
//!                                               │ (gen 1..N)  │
//!                                               └─────────────┘
//! ```
//!
//! A write is journaled, then buffered; when the active buffer fills, the
//! journal rotates and the buffer retires to a background worker that
//! persists it as the next segment generation and deletes the journal. A
//! read checks the active buffer, the retiring buffer, then segment
//! generations newest to oldest; the first match wins.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod logfile;
pub mod tree;
pub mod files;
pub mod memtable;
pub mod wal;
pub mod storage;
pub mod flush;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EmberError, Result};
pub use config::{Config, SyncPolicy};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
