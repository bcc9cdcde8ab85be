//! Shard Store
//!
//! Key → path resolution and file-level primitives.

use std::fs::{self, DirBuilder, File, Metadata, OpenOptions};
use std::io::{self, Write};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::config::{Config, SyncStrategy};
use crate::error::{Result, ShardLogError};

/// Permissions for shard directories (owner only)
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

/// Permissions for shard files (owner read/write only)
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Directory tree where every key is split at a fixed cutoff
#[derive(Debug, Clone)]
pub struct ShardStore {
    /// Normalized root directory
    root: PathBuf,
    /// Shard prefix length (always > 0)
    cutoff: usize,
    /// Whether mutations are followed by sync_data
    sync: SyncStrategy,
}

impl ShardStore {
    /// Open or create a shard tree rooted at `root`
    ///
    /// Fails with `Config` when `cutoff` is zero or when `root` is empty or
    /// resolves to the working directory. The root is created if missing.
    pub fn new(root: impl AsRef<Path>, cutoff: usize) -> Result<Self> {
        Self::with_sync(root.as_ref(), cutoff, SyncStrategy::Never)
    }

    /// Open or create the shard tree described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_sync(&config.root, config.cutoff, config.sync)
    }

    fn with_sync(root: &Path, cutoff: usize, sync: SyncStrategy) -> Result<Self> {
        if cutoff == 0 {
            return Err(ShardLogError::Config("cutoff must be positive".to_string()));
        }

        let root = clean(root);
        if root.as_os_str().is_empty() || root == Path::new(".") {
            return Err(ShardLogError::Config(
                "cannot use the working directory as shard root".to_string(),
            ));
        }

        if !root.exists() {
            dir_builder().recursive(true).create(&root)?;
            debug!(root = %root.display(), "created shard root");
        }

        Ok(Self { root, cutoff, sync })
    }

    /// Split a key into its shard directory and file path
    ///
    /// `key[..cutoff]` names the directory and `key[cutoff..]` the file,
    /// split at byte `cutoff`. Keys no longer than the cutoff are rejected
    /// rather than truncated.
    pub fn resolve(&self, key: &str) -> Result<(PathBuf, PathBuf)> {
        if key.len() <= self.cutoff {
            return Err(self.invalid(key));
        }

        let (prefix, suffix) = split_key(key, self.cutoff).ok_or_else(|| self.invalid(key))?;
        if !is_plain_component(prefix) || !is_plain_component(suffix) {
            return Err(self.invalid(key));
        }

        let dir = self.root.join(prefix);
        let file = dir.join(suffix);
        Ok((dir, file))
    }

    /// Write the entire file for `key`, replacing any existing contents
    pub fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let (dir, path) = self.resolve(key)?;
        self.ensure_dir(&dir)?;

        let mut file = file_options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.write_all(data)?;
        self.sync(&file)?;

        debug!(key, size = data.len(), "wrote shard file");
        Ok(())
    }

    /// Read the entire file for `key`
    pub fn read(&self, key: &str) -> Result<Bytes> {
        let (_, path) = self.resolve(key)?;
        Ok(Bytes::from(fs::read(path)?))
    }

    /// Open the file for `key` for reading (positioned/streaming access)
    pub fn open(&self, key: &str) -> Result<File> {
        let (_, path) = self.resolve(key)?;
        Ok(File::open(path)?)
    }

    /// Open the file for `key` for positioned reads, writes and truncation
    ///
    /// With `create_if_missing` the shard directory and file are created
    /// when absent; otherwise a missing file is an `Io` NotFound error.
    pub fn open_for_update(&self, key: &str, create_if_missing: bool) -> Result<File> {
        let (dir, path) = self.resolve(key)?;
        if create_if_missing {
            self.ensure_dir(&dir)?;
        }

        let file = file_options()
            .read(true)
            .write(true)
            .create(create_if_missing)
            .open(path)?;
        Ok(file)
    }

    /// Metadata for the file behind `key`
    pub fn stat(&self, key: &str) -> Result<Metadata> {
        let (_, path) = self.resolve(key)?;
        Ok(fs::metadata(path)?)
    }

    /// Whether the file for `key` can be statted
    ///
    /// Invalid keys, permission errors and the like all count as absent:
    /// a file we cannot stat is not usable.
    pub fn exists(&self, key: &str) -> bool {
        self.stat(key).is_ok()
    }

    /// Delete the file for `key`, then its shard directory if now empty
    pub fn remove(&self, key: &str) -> Result<()> {
        let (dir, path) = self.resolve(key)?;
        fs::remove_file(&path)?;
        debug!(key, "removed shard file");

        remove_if_empty(&dir)
    }

    /// Delete the whole shard tree, root included
    pub fn remove_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                debug!(root = %self.root.display(), "removed shard root");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Flush a handle to disk if the sync strategy asks for it
    pub(crate) fn sync(&self, file: &File) -> Result<()> {
        if self.sync == SyncStrategy::EveryMutation {
            file.sync_data()?;
        }
        Ok(())
    }

    /// Get the shard root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the shard prefix length
    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn invalid(&self, key: &str) -> ShardLogError {
        ShardLogError::InvalidName {
            key: key.to_string(),
            cutoff: self.cutoff,
        }
    }

    /// Create a shard directory unless it already exists
    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        match fs::metadata(dir) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match dir_builder().create(dir) {
                    Ok(()) => {
                        debug!(dir = %dir.display(), "created shard directory");
                        Ok(())
                    }
                    // Lost a race with another creator
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Remove `dir` only if reading one entry finds nothing
fn remove_if_empty(dir: &Path) -> Result<()> {
    let mut entries = fs::read_dir(dir)?;
    match entries.next() {
        Some(Ok(_)) => return Ok(()),
        Some(Err(e)) => return Err(e.into()),
        None => {}
    }

    fs::remove_dir(dir)?;
    debug!(dir = %dir.display(), "removed empty shard directory");
    Ok(())
}

/// Split a key at byte `cutoff`
#[cfg(unix)]
fn split_key(key: &str, cutoff: usize) -> Option<(&OsStr, &OsStr)> {
    use std::os::unix::ffi::OsStrExt;

    let (prefix, suffix) = key.as_bytes().split_at(cutoff);
    Some((OsStr::from_bytes(prefix), OsStr::from_bytes(suffix)))
}

/// Split a key at byte `cutoff`; paths here must stay valid UTF-8
#[cfg(not(unix))]
fn split_key(key: &str, cutoff: usize) -> Option<(&OsStr, &OsStr)> {
    if !key.is_char_boundary(cutoff) {
        return None;
    }
    let (prefix, suffix) = key.split_at(cutoff);
    Some((OsStr::new(prefix), OsStr::new(suffix)))
}

/// A key part must map to exactly one normal path component
fn is_plain_component(part: &OsStr) -> bool {
    let mut components = Path::new(part).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == part
    )
}

/// Lexically normalize a path: drop `.`, fold `name/..`
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn dir_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
}

fn file_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    options
}
