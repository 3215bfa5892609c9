//! Error types for stylesync-sync.

use std::path::PathBuf;

use thiserror::Error;

use stylesync_core::{ConfigError, VcsError};
use stylesync_renderer::RenderError;

/// All errors that can abort a synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A version-control subprocess failed.
    #[error("version control error: {0}")]
    Vcs(#[from] VcsError),

    /// A managed file has no commit touching it.
    #[error("no commit history for {path}")]
    MissingHistory { path: PathBuf },

    /// The reported commit time could not be parsed.
    #[error("invalid commit time {value:?} for {path}: {source}")]
    InvalidTimestamp {
        path: PathBuf,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The pre-publish checks rejected the distribution.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The run lock could not be opened or taken.
    #[error("cannot lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reasons the distribution may not be published.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("style counts do not match (source {source_count}, distribution {distribution_count})")]
    CountMismatch {
        source_count: usize,
        distribution_count: usize,
    },

    #[error("distribution has {count} styles, fewer than the minimum of {floor}")]
    BelowFloor { count: usize, floor: usize },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
