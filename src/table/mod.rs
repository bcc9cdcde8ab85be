//! Table Module
//!
//! Per-key append-only logs of fixed-width rows, one file per key, stored
//! in a [`ShardStore`](crate::shard::ShardStore).
//!
//! ## Responsibilities
//! - Create a key's file on first insert
//! - Append rows (plain or uniqueness-checked)
//! - Delete a row and compact the rows after it
//! - Return the most recent N rows, latest first
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (8 bytes)                                        │
//! │   Row count C: u64 little-endian                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Rows (C * W bytes)                                      │
//! │   [Row 1: W bytes][Row 2: W bytes] ... [Row C: W bytes] │
//! │   oldest first, new rows appended at the tail           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! When no operation is in progress the file size is `8 + C * W`.
//!
//! ## Costs
//! - insert: O(1)
//! - insert_unique: O(rows) scan
//! - delete: O(rows) scan plus a shift of the rows after the match
//! - index_n: O(n)

mod header;
mod row_table;

pub use header::{decode_count, encode_count, read_count, write_count};
pub use row_table::RowTable;

/// Header size: row count (8) = 8 bytes
pub const HEADER_SIZE: u64 = 8;
