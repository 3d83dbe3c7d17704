//! Records flowing through the pipeline and the results workers report back

use serde::{Deserialize, Serialize};

/// One input item. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub password: String,
    pub passes:   i64,
    pub salt:     i64
}

impl Record {
    pub fn new(password: impl Into<String>, passes: i64, salt: i64) -> Self {
        Self { password: password.into(), passes, salt }
    }
}

/// A record routed to a specific worker
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Index of the worker the item was assigned to
    pub worker:   usize,
    /// Position of the record in the submitted batch
    pub sequence: usize,
    pub record:   Record
}

/// What a worker reports to the distributor
#[derive(Debug, Clone)]
pub enum WorkerResult {
    /// The transformed value passed the filter
    Accepted { worker: usize, sequence: usize, value: String, record: Record },
    /// The transformed value was filtered out
    Rejected { worker: usize, sequence: usize },
    /// The transform itself failed
    Failed { worker: usize, sequence: usize, reason: String },
    /// The worker drained its mailbox up to the end signal
    Done { worker: usize }
}

impl WorkerResult {
    /// Classify a transformed value for the given work item.
    pub fn classify(item: WorkItem, value: String) -> Self {
        if is_filtered_out(&value) {
            WorkerResult::Rejected { worker: item.worker, sequence: item.sequence }
        } else {
            WorkerResult::Accepted { worker: item.worker, sequence: item.sequence, value, record: item.record }
        }
    }

    pub fn worker(&self) -> usize {
        match self {
            WorkerResult::Accepted { worker, .. }
            | WorkerResult::Rejected { worker, .. }
            | WorkerResult::Failed { worker, .. }
            | WorkerResult::Done { worker } => *worker
        }
    }
}

/// A value is dropped when its first character is an ASCII decimal digit.
/// An empty value has no first character and is kept.
pub fn is_filtered_out(value: &str) -> bool {
    value.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Accepted value paired with the record it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectedEntry {
    pub value:    String,
    pub record:   Record,
    pub worker:   usize,
    pub sequence: usize
}
