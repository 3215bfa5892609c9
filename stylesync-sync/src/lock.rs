//! Process-wide exclusive run lock.
//!
//! A [`LockGuard`] holds an OS-level exclusive lock (`flock` on unix) on a
//! fixed file for as long as it lives. A second acquirer, in this process or
//! any other, blocks until the holder is dropped. There is no timeout.
//!
//! Dropping the guard only unlocks; the lock file stays on disk. After a fully
//! successful cycle [`LockGuard::finish`] also removes it, while still holding
//! the lock. A waiter that wakes up holding a lock on a removed file lets go
//! and starts over on whatever file is now at the path, so there is never more
//! than one holder.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::SyncError;

/// Exclusive hold on the run lock; released on drop.
#[derive(Debug)]
pub struct LockGuard {
    file: Option<File>,
    path: PathBuf,
}

impl LockGuard {
    /// Block until the lock at `path` is held exclusively.
    pub fn acquire(path: &Path) -> Result<Self, SyncError> {
        let lock_err = |source: std::io::Error| SyncError::Lock {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(lock_err)?;
        }

        loop {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(path)
                .map_err(lock_err)?;

            tracing::debug!("waiting for lock {}", path.display());
            FileExt::lock_exclusive(&file).map_err(lock_err)?;

            if is_current(&file, path).map_err(lock_err)? {
                tracing::debug!("acquired lock {}", path.display());
                return Ok(Self {
                    file: Some(file),
                    path: path.to_path_buf(),
                });
            }
            // Removed by the previous holder; dropping `file` releases it.
            tracing::debug!("lock file {} was replaced, retrying", path.display());
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the lock file, then release the lock.
    pub fn finish(mut self) -> Result<(), SyncError> {
        let removed = match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SyncError::Lock {
                path: self.path.clone(),
                source,
            }),
        };
        self.unlock();
        removed
    }

    fn unlock(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(err) = FileExt::unlock(&file) {
                tracing::warn!("failed to unlock {}: {err}", self.path.display());
            }
            tracing::debug!("released lock {}", self.path.display());
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.unlock();
    }
}

/// True when `file` is still the file linked at `path`.
#[cfg(unix)]
fn is_current(file: &File, path: &Path) -> std::io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match std::fs::metadata(path) {
        Ok(linked) => Ok(held.dev() == linked.dev() && held.ino() == linked.ino()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(not(unix))]
fn is_current(_file: &File, path: &Path) -> std::io::Result<bool> {
    Ok(path.exists())
}
