//! kvdb CLI - ordered key-value access to a Redis key space.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// kvdb CLI - ordered key-value access to a Redis key space.
///
/// Every command opens a backend, which scans all keys under the namespace
/// prefix before doing anything else. Settings come from the optional YAML
/// config file; flags override it.
#[derive(Parser)]
#[command(name = "kvdb")]
#[command(about = "Ordered key-value CLI over Redis")]
#[command(version)]
pub struct Cli {
    /// Config file (YAML)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Redis URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Namespace prefix for managed keys
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// SCAN page size used while building the key index
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the value of a key
    Get {
        key: String,
    },
    /// Store a value under a key
    Put {
        key: String,
        value: String,
    },
    /// Delete a key
    #[command(alias = "delete")]
    Del {
        key: String,
    },
    /// List entries in key order
    Find {
        /// First key to list (default: from the beginning)
        #[arg(default_value = "")]
        start: String,
        /// Stop after this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print keys only, without fetching values
        #[arg(long)]
        keys_only: bool,
    },
    /// Print the number of indexed keys
    Count,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    commands::run(&cli)
}
