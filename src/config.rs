//! Configuration for ShardLog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, ShardLogError};

/// Main configuration for a ShardLog table
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Shard Configuration
    // -------------------------------------------------------------------------
    /// Root directory of the shard tree
    /// Internal structure:
    ///   {root}/
    ///     └── {key[..cutoff]}/
    ///           └── {key[cutoff..]}   (one table file per key)
    pub root: PathBuf,

    /// Shard prefix length; keys must be strictly longer than this
    pub cutoff: usize,

    // -------------------------------------------------------------------------
    // Table Configuration
    // -------------------------------------------------------------------------
    /// Fixed byte width of every row
    pub row_width: usize,

    /// When to fsync table files after a mutation
    pub sync: SyncStrategy,
}

/// File sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// Leave flushing to the OS (fastest)
    #[default]
    Never,

    /// sync_data after every write, insert and delete (safest, slowest)
    EveryMutation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./shardlog_data"),
            cutoff: 2,
            row_width: 32,
            sync: SyncStrategy::Never,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the table-level values
    ///
    /// `cutoff` and `root` belong to the shard store and are checked when
    /// it is opened.
    pub fn validate(&self) -> Result<()> {
        if self.row_width == 0 {
            return Err(ShardLogError::Config(
                "row width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the shard root directory
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root = path.into();
        self
    }

    /// Set the shard prefix length
    pub fn cutoff(mut self, cutoff: usize) -> Self {
        self.config.cutoff = cutoff;
        self
    }

    /// Set the row width (in bytes)
    pub fn row_width(mut self, width: usize) -> Self {
        self.config.row_width = width;
        self
    }

    /// Set the sync strategy
    pub fn sync(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
