//! Qbert CLI - train and inspect multi-policy Q-learning agents
//!
//! - `train`: play episodes on the board simulator, learning every move
//! - `inspect`: summarise a saved Q-table file

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qbert")]
#[command(version, about = "Tabular multi-policy Q-learning for Qbert", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent on the board simulator
    Train(Box<qbert::cli::commands::train::TrainArgs>),

    /// Inspect saved Q-tables
    Inspect(qbert::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Train(args) => qbert::cli::commands::train::execute(*args),
        Commands::Inspect(args) => qbert::cli::commands::inspect::execute(args),
    }
}
