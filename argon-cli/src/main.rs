//! Argon CLI
//!
//! Declarative audio/video recording session orchestration.
//!
//! # Usage
//!
//! ```bash
//! # Validate the active configuration
//! argon check
//!
//! # Validate with extra parameters and drive a simulated session
//! argon check -p "max-duration=60000;video-param-encoding-bitrate=500000" --dry-run
//!
//! # Show supported formats and encoders
//! argon info
//! ```

mod commands;
mod sim;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Argon - recording session orchestration
#[derive(Parser)]
#[command(name = "argon")]
#[command(author = "GhostKellz")]
#[command(version)]
#[command(about = "Declarative audio/video recording session orchestration", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a recording configuration and preview negotiation
    Check(commands::CheckArgs),

    /// Manage the configuration file
    Config(commands::ConfigArgs),

    /// Show supported formats, encoders and their constraints
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("argon_core={}", level).parse().unwrap())
                .add_directive(format!("argon_cli={}", level).parse().unwrap()),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Check(args) => commands::check(args).await,
        Commands::Config(args) => commands::config(args).await,
        Commands::Info => commands::info().await,
    }
}
