//! # hashpool
//!
//! An actor pipeline that hashes a batch of records across a worker pool.
//!
//! This crate provides:
//! - Distributor, Worker, Collector and Printer actors built on Ractor
//! - Round-robin dispatch with an end-of-stream barrier that fires exactly once
//! - A pluggable per-record [`Transform`] and report [`ReportSink`]
//! - The fixed-width report layout and run orchestration via [`Pipeline`]

pub mod actor;
pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod port;

// Re-export commonly used types
pub use adapter::{
    loader::load_records,
    sink::{FileSink, MemorySink},
    transform::Base64Transform
};
pub use cli::HashpoolCli;
pub use config::{FileConfig, PipelineConfig, default_worker_count};
pub use domain::{
    error::PipelineError,
    record::{CollectedEntry, Record, WorkerResult},
    report::{RunReport, RunSummary}
};
pub use pipeline::Pipeline;
pub use port::{sink::ReportSink, transform::Transform};
