//! Command-line interface for stock-sync
//!
//! Provides `sync`, `locations` and `template` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod locations;
mod sync;
mod template;
mod utils;

/// Reconcile per-location inventory from a CSV of scanned variant IDs
#[derive(Parser)]
#[command(name = "stock-sync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Set on-hand quantities at a location from an uploaded CSV
    Sync(Box<sync::SyncArgs>),

    /// List the shop's stock locations
    Locations(locations::LocationsArgs),

    /// Write a sample upload CSV
    Template(template::TemplateArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Sync(args) => sync::run(*args),
        Commands::Locations(args) => locations::run(args),
        Commands::Template(args) => template::run(args),
    }
}
