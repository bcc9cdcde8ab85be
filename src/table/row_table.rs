//! Row Table
//!
//! Binary row-log operations on top of the shard store.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{Result, ShardLogError};
use crate::shard::ShardStore;

use super::{encode_count, read_count, write_count, HEADER_SIZE};

/// Keyed append-only log of fixed-width rows
///
/// ## Concurrency:
/// - `lock`: one Mutex for the whole table, held for the full duration of
///   every operation (reads included)
/// - Operations on different keys still serialize against each other
/// - No protection against other processes sharing the same root
pub struct RowTable {
    /// Key → file mapping and file primitives
    store: ShardStore,

    /// Byte width of every row (always > 0)
    row_width: usize,

    /// Serializes all table operations
    lock: Mutex<()>,
}

impl RowTable {
    /// Open or create a table with the given config
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let store = ShardStore::from_config(&config)?;

        Ok(Self {
            store,
            row_width: config.row_width,
            lock: Mutex::new(()),
        })
    }

    /// Open with explicit parameters (convenience method)
    ///
    /// Uses the default sync strategy
    pub fn new(root: impl AsRef<Path>, cutoff: usize, row_width: usize) -> Result<Self> {
        let config = Config::builder()
            .root(root.as_ref())
            .cutoff(cutoff)
            .row_width(row_width)
            .build();
        Self::open(config)
    }

    /// Append a row to the key's log, creating the log if needed
    pub fn insert(&self, key: &str, row: &[u8]) -> Result<()> {
        let _guard = self.lock.lock();
        self.check_width(row)?;

        if !self.store.exists(key) {
            return self.create(key, row);
        }

        let mut file = self.store.open_for_update(key, false)?;
        let count = read_count(&mut file)?;
        self.append(&mut file, count, row)?;

        debug!(key, rows = count + 1, "appended row");
        Ok(())
    }

    /// Append a row unless an identical row is already present
    ///
    /// Scans every existing row; a match leaves the file untouched.
    pub fn insert_unique(&self, key: &str, row: &[u8]) -> Result<()> {
        let _guard = self.lock.lock();
        self.check_width(row)?;

        if !self.store.exists(key) {
            return self.create(key, row);
        }

        let mut file = self.store.open_for_update(key, false)?;
        let count = read_count(&mut file)?;

        if let Some(index) = self.find_row(&mut file, row)? {
            trace!(key, index, "row already present");
            return Ok(());
        }

        self.append(&mut file, count, row)?;

        debug!(key, rows = count + 1, "appended unique row");
        Ok(())
    }

    /// Remove the first row equal to `row`, shifting later rows down
    ///
    /// Returns:
    /// - `Err(KeyNotFound)`: the key has no log
    /// - `Ok(())`: the row was removed, or was not present (no change)
    pub fn delete(&self, key: &str, row: &[u8]) -> Result<()> {
        let _guard = self.lock.lock();
        self.require(key)?;
        self.check_width(row)?;

        let mut file = self.store.open_for_update(key, false)?;
        let count = read_count(&mut file)?;
        self.check_len(key, &file, count)?;

        // 1-based position of the match
        let index = match self.find_row(&mut file, row)? {
            Some(index) => index,
            None => {
                trace!(key, "row not present, nothing to delete");
                return Ok(());
            }
        };

        if index > count {
            warn!(key, index, count, "row found past the header count");
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("row {} lies beyond header count {}", index, count),
            )
            .into());
        }

        // Shift every row after the match down by one
        let tail_len = (count - index) as usize * self.row_width;
        let mut tail = vec![0u8; tail_len];

        file.seek(SeekFrom::Start(self.row_offset(index)))?;
        file.read_exact(&mut tail)?;

        file.seek(SeekFrom::Start(self.row_offset(index - 1)))?;
        file.write_all(&tail)?;

        // Drop the now-duplicated last row, then fix the count
        file.set_len(self.row_offset(count - 1))?;
        write_count(&mut file, count - 1)?;
        self.store.sync(&file)?;

        debug!(key, index, rows = count - 1, "deleted row");
        Ok(())
    }

    /// Return up to `n` rows, most recently inserted first
    ///
    /// `n == 0` (or `n` at least the row count) returns every row.
    pub fn index_n(&self, key: &str, n: u64) -> Result<Vec<Bytes>> {
        let _guard = self.lock.lock();
        self.require(key)?;

        let mut file = self.store.open(key)?;
        let count = read_count(&mut file)?;
        self.check_len(key, &file, count)?;

        let take = if n == 0 || n >= count { count } else { n };

        // Read the last `take` rows in one go
        let mut block = vec![0u8; take as usize * self.row_width];
        file.seek(SeekFrom::Start(self.row_offset(count - take)))?;
        file.read_exact(&mut block)?;

        // Oldest of the block comes last in the result
        let block = Bytes::from(block);
        let width = self.row_width;
        let rows = (0..take as usize)
            .rev()
            .map(|i| block.slice(i * width..(i + 1) * width))
            .collect();

        Ok(rows)
    }

    /// Number of rows stored for `key`
    pub fn row_count(&self, key: &str) -> Result<u64> {
        let _guard = self.lock.lock();
        self.require(key)?;

        let mut file = self.store.open(key)?;
        read_count(&mut file)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the row width (in bytes)
    pub fn row_width(&self) -> usize {
        self.row_width
    }

    /// Get the underlying shard store (for explicit file removal)
    pub fn store(&self) -> &ShardStore {
        &self.store
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_width(&self, row: &[u8]) -> Result<()> {
        if row.len() != self.row_width {
            return Err(ShardLogError::RowWidthMismatch {
                expected: self.row_width,
                actual: row.len(),
            });
        }
        Ok(())
    }

    /// Fail with InvalidName or KeyNotFound unless the key's log exists
    fn require(&self, key: &str) -> Result<()> {
        self.store.resolve(key)?;
        if !self.store.exists(key) {
            return Err(ShardLogError::KeyNotFound(key.to_string()));
        }
        Ok(())
    }

    /// File offset of the row after `index` rows
    fn row_offset(&self, index: u64) -> u64 {
        HEADER_SIZE + index * self.row_width as u64
    }

    /// Write a brand-new log holding a single row
    fn create(&self, key: &str, row: &[u8]) -> Result<()> {
        let mut data = Vec::with_capacity(HEADER_SIZE as usize + row.len());
        data.extend_from_slice(&encode_count(1));
        data.extend_from_slice(row);

        self.store.write(key, &data)?;

        debug!(key, "created table file");
        Ok(())
    }

    /// Bump the header count, then write the row at end of file
    fn append(&self, file: &mut File, count: u64, row: &[u8]) -> Result<()> {
        write_count(file, count + 1)?;

        file.seek(SeekFrom::End(0))?;
        file.write_all(row)?;

        self.store.sync(file)
    }

    /// Forward scan for the first row equal to `row`
    ///
    /// Returns its 1-based index, or `None` at end of file.
    fn find_row(&self, file: &mut File, row: &[u8]) -> Result<Option<u64>> {
        file.seek(SeekFrom::Start(HEADER_SIZE))?;

        let mut reader = BufReader::new(file);
        let mut buf = vec![0u8; self.row_width];
        let mut index = 0u64;

        loop {
            match reader.read_exact(&mut buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e.into()),
            }

            index += 1;

            if buf == row {
                return Ok(Some(index));
            }
        }
    }

    /// Reject a header that claims more rows than the file holds
    fn check_len(&self, key: &str, file: &File, count: u64) -> Result<()> {
        let expected = count
            .checked_mul(self.row_width as u64)
            .and_then(|rows| rows.checked_add(HEADER_SIZE));
        let actual = file.metadata()?.len();

        match expected {
            Some(expected) if expected <= actual => Ok(()),
            _ => {
                warn!(key, count, size = actual, "header count exceeds file size");
                Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("header claims {} rows but file is {} bytes", count, actual),
                )
                .into())
            }
        }
    }
}
