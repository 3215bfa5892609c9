//! Atomic file writes into the distribution checkout.
//!
//! Content goes to `<path>.stylesync.tmp` first and is renamed over the
//! final path, so an aborted run never leaves a half-written style behind.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

fn tmp_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.stylesync.tmp", path.display()))
}

/// Write `content` to `path` byte-for-byte, creating parent directories.
pub(crate) fn atomic_write(path: &Path, content: impl AsRef<[u8]>) -> Result<(), SyncError> {
    atomic_write_with_tmp(path, content.as_ref(), &tmp_path_for(path))
}

fn atomic_write_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::debug!("wrote: {}", path.display());
    Ok(())
}
