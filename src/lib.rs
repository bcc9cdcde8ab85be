//! # ShardLog
//!
//! A lightweight on-disk tabular store:
//! - One append-ordered log of fixed-width rows per string key
//! - One file per key, placed by a directory-sharding scheme
//! - Plain and uniqueness-checked inserts, compacting deletes
//! - "Most recent N rows" retrieval, latest first
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RowTable                              │
//! │      insert / insert_unique / delete / index_n (Mutex)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ key → file handle
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       ShardStore                             │
//! │        {root}/{key[..cutoff]}/{key[cutoff..]}                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐
//!               │  Table file   │
//!               │ [count][rows] │
//!               └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use shardlog::RowTable;
//!
//! let table = RowTable::new("history", 2, 4)?;
//! table.insert("alice", b"r001")?;
//! table.insert("alice", b"r002")?;
//!
//! let latest = table.index_n("alice", 1)?;
//! assert_eq!(&latest[0][..], b"r002");
//! # Ok::<(), shardlog::ShardLogError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod shard;
pub mod table;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ShardLogError, Result};
pub use config::{Config, SyncStrategy};
pub use shard::ShardStore;
pub use table::RowTable;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ShardLog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
