//! Error types for stylesync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; serde_yaml supplies line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting was left empty.
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Failures of the version-control collaborator.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The subprocess could not be started at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The subprocess exited non-zero.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The subprocess printed something that is not UTF-8.
    #[error("`{command}` produced non UTF-8 output")]
    NonUtf8Output { command: String },

    /// The subprocess succeeded but printed nothing usable.
    #[error("`{command}` produced unexpected output: {output:?}")]
    UnexpectedOutput { command: String, output: String },
}
