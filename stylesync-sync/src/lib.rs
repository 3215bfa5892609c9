//! # stylesync-sync
//!
//! Mirrors the style files of a source checkout into a distribution
//! checkout, then commits and publishes the result.
//!
//! Call [`pipeline::run`] for a full locked push cycle. The building blocks
//! are public for callers that need a single step:
//!
//! - [`diff`]: metadata-blind comparison of one file pair
//! - [`timestamp`]: last-commit time of a path, normalized to UTC
//! - [`planner`]: copy new/changed files, collect the retained set
//! - [`prune`]: delete distribution files absent upstream
//! - [`validate`]: tracked-file count checks before publishing
//! - [`lock`]: process-wide exclusive lock around a run

pub mod diff;
pub mod error;
pub mod lock;
pub mod pipeline;
pub mod planner;
pub mod prune;
pub mod timestamp;
pub mod validate;
mod writer;

pub use diff::Classification;
pub use error::{SyncError, ValidationError};
pub use lock::LockGuard;
pub use pipeline::{PushReport, PushRequest};
pub use planner::SyncResult;
pub use validate::StyleCounts;
