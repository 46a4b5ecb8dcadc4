//! HEXCONQUEST CLI - Command-line interface
//!
//! Commands:
//! - play: Simulate a single match
//! - batch: Simulate many seeded matches in parallel
//! - config: Print the reference configuration

mod batch_cmd;
mod config_cmd;
mod play_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexconquest")]
#[command(about = "HEXCONQUEST faction conquest simulator")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log every combat, move and control point award
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a single match
    Play(play_cmd::PlayArgs),
    /// Simulate many matches and report win statistics
    Batch(batch_cmd::BatchArgs),
    /// Print the reference configuration as JSON
    Config(config_cmd::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so reports on stdout stay clean)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Batch(args) => batch_cmd::run(args, cli.seed),
        Commands::Config(args) => config_cmd::run(args),
    }
}
