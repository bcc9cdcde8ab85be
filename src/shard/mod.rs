//! Shard Module
//!
//! Maps string keys onto a two-level directory tree and provides the file
//! primitives the row table is built on.
//!
//! ## Responsibilities
//! - Resolve a key to `{root}/{key[..cutoff]}/{key[cutoff..]}`
//! - Whole-file write/read, streaming and read/write handles
//! - Existence checks, single-file removal, full-tree removal
//! - Create shard directories lazily, remove them once drained
//!
//! ## Layout
//! With root `images` and cutoff 3, the keys `transistor`, `speaker` and
//! `speech` are stored as:
//! ```text
//! images/
//! ├── spe/
//! │   ├── aker
//! │   └── ech
//! └── tra/
//!     └── nsistor
//! ```
//!
//! No internal synchronization: callers serialize access to a given file.

mod store;

pub use store::ShardStore;
