//! CLI interface for folio-feed
//!
//! Provides subcommands for:
//! - `fetch`: retrieve and align a monthly batch
//! - `weekly`: retrieve a weekly batch
//! - `status`: show current state
//! - `config`: show configuration

mod fetch;
mod weekly;

pub use fetch::FetchArgs;
pub use weekly::WeeklyArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "folio-feed")]
#[command(about = "Market-data ingestion and alignment pipeline for portfolio optimization")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve and align a monthly batch for the given symbols
    Fetch(FetchArgs),
    /// Retrieve a weekly batch for the given symbols
    Weekly(WeeklyArgs),
    /// Show current state
    Status,
    /// Show configuration
    Config,
}
