//! `stylesync push`: one locked sync cycle from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stylesync_core::{config, Git, Revision, SyncConfig};
use stylesync_sync::{pipeline, PushReport, PushRequest};

/// Arguments for `stylesync push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Checkout of the upstream style repository.
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Checkout of the distribution repository.
    #[arg(long, value_name = "DIR")]
    pub distribution: Option<PathBuf>,

    /// Source revision to mirror.
    #[arg(long, value_name = "REV", default_value = stylesync_core::types::HEAD)]
    pub commit: String,

    /// Commit locally but do not push.
    #[arg(long)]
    pub dry_run: bool,

    /// YAML settings file; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run lock file.
    #[arg(long, value_name = "FILE")]
    pub lock_file: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        stylesync_daemon::init_tracing();

        let config = self.resolve_config()?;
        let request = PushRequest {
            revision: Revision::from(self.commit.as_str()),
            dry_run: self.dry_run,
        };

        let report = pipeline::run(&config, &Git::new(), &request)
            .with_context(|| format!("push to {} failed", request.revision))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize push report")?
            );
        } else {
            print_report(&report);
        }
        Ok(())
    }

    fn resolve_config(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => config::load_sync_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => SyncConfig::default(),
        };
        if let Some(source) = &self.source {
            config.source_root = source.clone();
        }
        if let Some(distribution) = &self.distribution {
            config.distribution_root = distribution.clone();
        }
        if let Some(lock) = &self.lock_file {
            config.lock_path = lock.clone();
        }
        config
            .validate()
            .context("pass --source and --distribution, or a --config file that sets them")?;
        Ok(config)
    }
}

fn print_report(report: &PushReport) {
    println!("Added: {}", report.added);
    println!("Updated: {}", report.updated);
    println!("Skipped: {}", report.skipped);
    println!("Deleted: {}", report.deleted);
    println!("Original styles: {}", report.counts.source);
    println!("Distribution styles: {}", report.counts.distribution);
    if report.pushed {
        println!("Pushed {} (source {})", report.revision, report.source_commit);
    } else {
        println!("Dry run: committed {} locally, not pushed", report.source_commit);
    }
}
