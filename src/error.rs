//! Error types for ShardLog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ShardLogError
pub type Result<T> = std::result::Result<T, ShardLogError>;

/// Unified error type for ShardLog operations
#[derive(Debug, Error)]
pub enum ShardLogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Key {key:?} cannot fit the shard scheme (cutoff {cutoff})")]
    InvalidName { key: String, cutoff: usize },

    #[error("Row width mismatch: expected {expected} bytes, got {actual}")]
    RowWidthMismatch { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Table Errors
    // -------------------------------------------------------------------------
    #[error("No such key: {0}")]
    KeyNotFound(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
