//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Copy partner inventory quantities onto the owner store.
#[derive(Debug, Clone, Parser)]
#[command(name = "stocksync", version, about)]
pub struct Cli {
    /// Config file (TOML or JSON); environment variables override it
    #[arg(long, value_name = "PATH", env = "STOCKSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only sync this partner shop
    #[arg(long, value_name = "SHOP")]
    pub partner: Option<String>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}
