//! Last-commit time of a style, normalized to UTC.
//!
//! Dates are always stored as UTC rather than in the committer's zone, so
//! the same commit yields the same `<updated>` value on every machine.

use std::path::Path;

use chrono::{DateTime, Utc};

use stylesync_core::VersionControl;

use crate::error::SyncError;

/// Layout of `git log --format=%ci`, e.g. `2024-03-01 12:00:00 +0200`.
const COMMIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Convert a committer time with offset into an ISO-8601 UTC string
/// (`2024-03-01T10:00:00+00:00`).
pub fn normalize(raw: &str) -> Result<String, chrono::ParseError> {
    let parsed = DateTime::parse_from_str(raw.trim(), COMMIT_TIME_FORMAT)?;
    Ok(parsed.with_timezone(&Utc).to_rfc3339())
}

/// Resolve the `<updated>` value for `rel_path` inside `repo`.
pub fn resolve(vcs: &dyn VersionControl, repo: &Path, rel_path: &Path) -> Result<String, SyncError> {
    let raw = vcs
        .last_commit_time(repo, rel_path)?
        .ok_or_else(|| SyncError::MissingHistory {
            path: rel_path.to_path_buf(),
        })?;
    normalize(&raw).map_err(|source| SyncError::InvalidTimestamp {
        path: rel_path.to_path_buf(),
        value: raw,
        source,
    })
}
