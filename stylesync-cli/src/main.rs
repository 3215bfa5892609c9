//! stylesync: mirror CSL styles into a distribution repository.
//!
//! # Usage
//!
//! ```text
//! stylesync push --source <dir> --distribution <dir> [--commit REV] [--dry-run] [--json]
//! stylesync push --config <file> [--commit REV]
//! stylesync serve --config <file> [--listen ADDR]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{push::PushArgs, serve::ServeArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stylesync",
    version,
    about = "Publish a timestamped copy of the CSL style repository",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one locked sync cycle and push the distribution repository.
    Push(PushArgs),

    /// Listen for webhook calls and run a sync for each accepted one.
    Serve(ServeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Push(args) => args.run(),
        Commands::Serve(args) => args.run(),
    }
}
