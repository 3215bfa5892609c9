//! Remove distribution styles that no longer exist upstream.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use stylesync_core::SyncConfig;

use crate::error::{io_err, SyncError};

/// Version-control metadata directory, never descended into.
const VCS_DIR: &str = ".git";

/// Delete every style under the distribution root whose relative path is not
/// in `retained`. Returns the number of files deleted.
pub fn prune_distribution(config: &SyncConfig, retained: &HashSet<PathBuf>) -> Result<usize, SyncError> {
    let root = &config.distribution_root;
    let mut deleted = 0;
    for path in collect_files(root)? {
        if !config.is_style_file(&path) {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path.as_path());
        if retained.contains(rel) {
            continue;
        }
        tracing::info!("Deleting {}", rel.display());
        std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        deleted += 1;
    }
    Ok(deleted)
}

/// All regular files below `root`, breadth-first, sorted.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut dirs = vec![root.to_path_buf()];
    let mut files = Vec::new();
    let mut cursor = 0;
    while cursor < dirs.len() {
        let current = dirs[cursor].clone();
        cursor += 1;
        let entries = match std::fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => return Err(io_err(&current, err)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&current, e))?;
            let ty = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
            if ty.is_dir() {
                if entry.file_name() != VCS_DIR {
                    dirs.push(entry.path());
                }
            } else if ty.is_file() {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}
