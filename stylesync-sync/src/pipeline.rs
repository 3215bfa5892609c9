//! Locked push cycle shared by the CLI and the webhook worker.
//!
//! ## Sequence
//!
//! 1. Source: checkout baseline branch, pull, checkout the target revision.
//! 2. Distribution: checkout baseline branch, pull.
//! 3. Copy new/changed styles, then prune styles gone upstream.
//! 4. Regenerate `README.md`.
//! 5. Stage everything in the distribution.
//! 6. Commit, referencing the source commit hash.
//! 7. Validate tracked style counts.
//! 8. Push, unless dry-run.
//!
//! The run lock is held from step 1 to step 8. Any failure aborts the
//! remaining steps and unlocks. A validation failure happens after step 6, so
//! the local commit stays in the distribution checkout, unpushed.

use serde::Serialize;

use stylesync_core::{Revision, SyncConfig, VersionControl};
use stylesync_renderer::{ReadmeContext, Renderer, README_FILE};

use crate::error::SyncError;
use crate::lock::LockGuard;
use crate::planner::sync_styles;
use crate::prune::prune_distribution;
use crate::validate::{validate, StyleCounts};
use crate::writer::atomic_write;

/// Parameters of one push cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushRequest {
    /// Source revision to mirror; `HEAD` of the baseline branch by default.
    pub revision: Revision,
    /// Do everything except `git push`.
    pub dry_run: bool,
}

/// What a completed push cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub revision: String,
    /// Hash of the source commit the distribution now mirrors.
    pub source_commit: String,
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub counts: StyleCounts,
    pub pushed: bool,
}

/// Run a full push cycle under the run lock.
pub fn run(
    config: &SyncConfig,
    vcs: &dyn VersionControl,
    request: &PushRequest,
) -> Result<PushReport, SyncError> {
    config.validate()?;

    let guard = LockGuard::acquire(&config.lock_path)?;
    let report = run_locked(config, vcs, request)?;
    guard.finish()?;
    Ok(report)
}

/// Steps 1 to 8 without taking the lock. Callers must already hold it.
pub fn run_locked(
    config: &SyncConfig,
    vcs: &dyn VersionControl,
    request: &PushRequest,
) -> Result<PushReport, SyncError> {
    let source = &config.source_root;
    let dist = &config.distribution_root;

    vcs.checkout(source, &config.baseline_branch)?;
    vcs.pull(source)?;
    vcs.checkout(source, request.revision.as_str())?;

    vcs.checkout(dist, &config.baseline_branch)?;
    vcs.pull(dist)?;

    let result = sync_styles(config, vcs)?;
    let deleted = prune_distribution(config, &result.retained)?;

    tracing::info!("Added: {}", result.added);
    tracing::info!("Updated: {}", result.updated);
    tracing::info!("Skipped: {}", result.skipped);
    tracing::info!("Deleted: {}", deleted);

    write_readme(config)?;

    vcs.add_all(dist)?;
    let source_commit = vcs.head_commit(source)?;
    vcs.commit_all(dist, &commit_message(config, &source_commit))?;

    let counts = validate(config, vcs)?;

    let pushed = if request.dry_run {
        tracing::info!("Dry run -- not pushing to distribution repo");
        false
    } else {
        tracing::info!("Pushing changes to distribution repo");
        vcs.push(dist)?;
        true
    };

    Ok(PushReport {
        revision: request.revision.to_string(),
        source_commit,
        added: result.added,
        updated: result.updated,
        skipped: result.skipped,
        deleted,
        counts,
        pushed,
    })
}

/// `Synced up to <upstream>/commit/<hash>`.
pub fn commit_message(config: &SyncConfig, source_commit: &str) -> String {
    format!(
        "Synced up to {}/commit/{}",
        config.upstream_url.trim_end_matches('/'),
        source_commit
    )
}

fn write_readme(config: &SyncConfig) -> Result<(), SyncError> {
    let renderer = Renderer::with_override(config.readme_template.as_deref())?;
    let readme = renderer.render_readme(&ReadmeContext::from_upstream(&config.upstream_url))?;
    atomic_write(&config.distribution_root.join(README_FILE), &readme)
}
