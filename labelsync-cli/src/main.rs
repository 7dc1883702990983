//! LabelSync: reconcile repository labels with a declarative manifest.
//!
//! # Usage
//!
//! ```text
//! labelsync check <manifest>
//! labelsync plan <manifest> --owner <owner> [--json]
//! labelsync sync <manifest> --owner <owner> [--dry-run] [--report <file>] [--siblings <file>]
//! labelsync access <manifest>
//! labelsync bootstrap <dir> --owner <owner> [--repo <name>] [--dry-run]
//! ```

mod commands;
mod github;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    access::AccessArgs, bootstrap::BootstrapArgs, check::CheckArgs, plan::PlanArgs,
    sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "labelsync",
    version,
    about = "Keep repository labels in sync with a labelsync.yml manifest",
    long_about = None,
)]
struct Cli {
    /// Log engine progress to stderr (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a manifest and summarize it. Works offline.
    Check(CheckArgs),

    /// Show what a sync would change, without changing anything.
    Plan(PlanArgs),

    /// Reconcile every repository of a manifest and report the result.
    Sync(SyncArgs),

    /// Verify the installation can reach every configured repository.
    Access(AccessArgs),

    /// Create the configuration repository from a local directory.
    Bootstrap(BootstrapArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Plan(args) => args.run().await,
        Commands::Sync(args) => args.run().await,
        Commands::Access(args) => args.run().await,
        Commands::Bootstrap(args) => args.run().await,
    }
}
