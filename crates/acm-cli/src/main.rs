//! # acm CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use acm_cli::check::{run_check, CheckArgs};
use acm_cli::inventory::{run_inventory, InventoryArgs};
use acm_cli::overview::{run_overview, OverviewArgs};
use acm_cli::EXIT_ERROR;

/// Arcade Compliance Manager CLI
///
/// Offline B3 quota evaluation: B3 machines may not exceed 20% of an
/// arcade's active machines.
#[derive(Parser, Debug)]
#[command(name = "acm", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check one arcade's machine list against the B3 quota.
    Check(CheckArgs),

    /// Summarize compliance across an organization's arcades.
    Overview(OverviewArgs),

    /// Validate an onboarding machine inventory draft.
    Inventory(InventoryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Overview(args) => run_overview(&args),
        Commands::Inventory(args) => run_inventory(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
