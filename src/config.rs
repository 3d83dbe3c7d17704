//! Run configuration
//!
//! Values come from an optional YAML file and the command line; flags win over the
//! file. Input and output paths are required once both are merged.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{cli::HashpoolCli, domain::error::PipelineError};

/// Configuration file layout
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input:    Option<PathBuf>,
    pub output:   Option<PathBuf>,
    pub workers:  Option<usize>,
    pub delay_ms: Option<u64>
}

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input:   PathBuf,
    pub output:  PathBuf,
    /// Fixed pool size; derived from the record count when absent
    pub workers: Option<usize>,
    /// Artificial delay applied by the transform
    pub delay:   Option<Duration>
}

impl PipelineConfig {
    /// Merge the optional config file with command-line flags.
    pub fn resolve(cli: &HashpoolCli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => load_config(path)?,
            None => FileConfig::default()
        };

        Self::merge(file, cli)
    }

    fn merge(file: FileConfig, cli: &HashpoolCli) -> Result<Self> {
        let Some(input) = cli.input.clone().or(file.input) else {
            bail!("no input file given (use --input or set `input` in the config file)");
        };
        let Some(output) = cli.output.clone().or(file.output) else {
            bail!("no output file given (use --output or set `output` in the config file)");
        };

        Ok(Self {
            input,
            output,
            workers: cli.workers.or(file.workers),
            delay: cli.delay_ms.or(file.delay_ms).filter(|ms| *ms > 0).map(Duration::from_millis)
        })
    }

    /// Pool size for a batch of `record_count` records.
    pub fn worker_count(&self, record_count: usize) -> Result<usize, PipelineError> {
        match self.workers {
            Some(0) => Err(PipelineError::Configuration("worker count must be at least 1".to_string())),
            Some(workers) => Ok(workers),
            None => Ok(default_worker_count(record_count))
        }
    }
}

/// Two workers for tiny batches, otherwise one worker per four records.
pub fn default_worker_count(record_count: usize) -> usize {
    if record_count <= 2 { 2 } else { (record_count / 4).max(1) }
}

/// Load a YAML config file
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}
