use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the webhook server and its sync worker.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] stylesync_core::ConfigError),

    #[error("sync error: {0}")]
    Sync(#[from] stylesync_sync::SyncError),

    /// Request body that is neither empty nor a form with a usable `payload`.
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),

    /// A server, worker or signal task died or could not be joined.
    #[error("task failed: {0}")]
    Task(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
