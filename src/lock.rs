//! File-based locking to prevent concurrent runs over the same output directory.
//!
//! Uses flock-style advisory locking, so two `update` runs never interleave
//! their writes into one set of output files.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE_NAME: &str = ".ipharvest.lock";

/// A guard that holds an exclusive lock on the output directory.
/// The lock is released when the guard is dropped.
pub struct LockGuard {
    _file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Attempt to acquire an exclusive lock on `dir`.
    /// Returns an error if another run already holds it.
    pub fn acquire(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        let path = dir.join(LOCK_FILE_NAME);

        // Open without truncating: the file only serves as a lock handle
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {:?}", path))?;

        file.try_lock_exclusive().map_err(|_| {
            anyhow::anyhow!(
                "Another ipharvest run is writing to {:?}.\n\
                 Wait for it to finish, or remove the lock file if it is stale: {:?}",
                dir,
                path
            )
        })?;

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
