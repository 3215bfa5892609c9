//! stylesync core library: configuration, domain types and the
//! version-control collaborator.
//!
//! - [`config`]: [`SyncConfig`] / [`ServerConfig`] and YAML loading
//! - [`types`]: [`Revision`] newtype
//! - [`vcs`]: [`VersionControl`] trait and the `git` subprocess backend
//! - [`error`]: [`ConfigError`], [`VcsError`]

pub mod config;
pub mod error;
pub mod types;
pub mod vcs;

pub use config::{ServerConfig, SyncConfig};
pub use error::{ConfigError, VcsError};
pub use types::Revision;
pub use vcs::{Git, VersionControl};
