//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

/// Hash a batch of records across a pool of worker actors and print the survivors
#[derive(Parser, Debug)]
#[command(name = "hashpool", author, version, about, long_about = None)]
pub struct HashpoolCli {
    /// JSON file with an array of {"password", "passes", "salt"} records
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Report file to create (truncated if it exists)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of workers (defaults to one per four records, two for tiny batches)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Artificial delay per transform, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// YAML config file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence when set)
    #[arg(short, long)]
    pub verbose: bool
}
