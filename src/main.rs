//! # hashpool
//!
//! Hashes a batch of records across a pool of worker actors and writes the values
//! that pass the filter to a fixed-width report.
//!
//! ## Usage
//!
//! ```bash
//! # Worker count derived from the batch size
//! hashpool --input data.json --output report.txt
//!
//! # Fixed pool with a simulated slow hash
//! hashpool -i data.json -o report.txt --workers 4 --delay-ms 50
//!
//! # Settings from a YAML file, overridden by flags
//! hashpool --config hashpool.yaml --verbose
//! ```
//!
//! ## Exit codes
//!
//! - `0` the report was written
//! - `1` the report file could not be opened
//! - `2` writing the report failed
//! - `3` anything that failed before the report stage (config, input, actors)

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use hashpool::{
    Base64Transform, FileSink, HashpoolCli, Pipeline, PipelineConfig, PipelineError, RunReport, load_records
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = HashpoolCli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(report) => {
            let summary = &report.summary;
            println!(
                "{} of {} records written ({} filtered out, {} failed) using {} workers",
                summary.rows_written, summary.submitted, summary.rejected, summary.failed, summary.workers
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &HashpoolCli) -> Result<RunReport, PipelineError> {
    let config = PipelineConfig::resolve(cli)?;
    let records = load_records(&config.input).await?;
    let workers = config.worker_count(records.len())?;

    let transform = match config.delay {
        Some(delay) => Base64Transform::with_delay(delay),
        None => Base64Transform::new()
    };

    Pipeline::new(workers, Arc::new(transform), Box::new(FileSink::new(&config.output))).run(records).await
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
