//! Typed messages for actor communication

use ractor::Message;
use tokio::sync::oneshot;

use crate::domain::{
    error::PipelineError,
    record::{CollectedEntry, Record, WorkItem, WorkerResult},
    report::{RunReport, RunSummary}
};

/// Channel the printer resolves once the report is written (or failed)
pub type RunOutcome = oneshot::Sender<Result<RunReport, PipelineError>>;

/// Messages for the Distributor actor (orchestrator)
#[derive(Debug)]
pub enum DistributorMessage {
    /// Spawn the worker pool, collector and printer
    Begin { worker_count: usize },
    /// Route one record to the next worker
    Record(Record),
    /// No more records will be submitted
    EndOfInput,
    /// A worker classified a record or drained its mailbox
    WorkerResult(WorkerResult),
    /// The collector's accumulated sequence
    Collected(Vec<CollectedEntry>)
}

/// Messages for Worker actors
#[derive(Debug)]
pub enum WorkerMessage {
    /// Transform and filter one record
    Item(WorkItem),
    /// Queued behind every item, answered with `Done`
    End
}

/// Messages for the Collector actor
#[derive(Debug)]
pub enum CollectorMessage {
    /// Append an accepted value
    Accepted(CollectedEntry),
    /// Send the current sequence to the distributor
    Flush
}

/// Messages for the Printer actor
#[derive(Debug)]
pub enum PrinterMessage {
    /// Write the report and resolve the run outcome
    Render { entries: Vec<CollectedEntry>, summary: RunSummary, outcome: RunOutcome }
}

// Implement Message trait for Ractor
impl Message for DistributorMessage {}
impl Message for WorkerMessage {}
impl Message for CollectorMessage {}
impl Message for PrinterMessage {}
