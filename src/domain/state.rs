//! Protocol state for the stateful actors
//!
//! The distributor and collector keep their bookkeeping in plain structs so the
//! transition rules can be exercised without spawning an actor system. The actors
//! own one instance each and apply the returned decisions.

use uuid::Uuid;

use crate::domain::{
    error::PipelineError,
    record::{CollectedEntry, WorkerResult},
    report::RunSummary
};

/// Distributor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistributorPhase {
    /// Waiting for `Begin`
    #[default]
    Initializing,
    /// Routing records to workers
    Dispatching,
    /// End signal broadcast, waiting for every worker to report done
    Draining,
    /// Collector asked for its sequence
    Flushing,
    /// Sequence handed to the printer
    Done
}

/// What the distributor should do with a worker result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
    /// Send the accepted value to the collector
    Forward,
    /// Filtered out or failed, nothing to send
    Drop,
    /// Last worker finished, ask the collector to flush
    Flush,
    /// Not valid in the current phase
    Ignore
}

#[derive(Debug, Clone, Default)]
pub struct DistributorState {
    phase:                 DistributorPhase,
    worker_count:          usize,
    workers_done:          usize,
    next_worker:           usize,
    end_of_input_received: bool,
    finished:              Vec<bool>,
    submitted:             usize,
    accepted:              usize,
    rejected:              usize,
    failed:                usize
}

impl DistributorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DistributorPhase {
        self.phase
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn workers_done(&self) -> usize {
        self.workers_done
    }

    pub fn end_of_input_received(&self) -> bool {
        self.end_of_input_received
    }

    /// Start dispatching with a fixed pool size, resetting every counter.
    pub fn begin(&mut self, worker_count: usize) -> Result<(), PipelineError> {
        if self.phase != DistributorPhase::Initializing {
            return Err(PipelineError::Protocol(format!("begin received while {:?}", self.phase)));
        }
        if worker_count == 0 {
            return Err(PipelineError::Configuration("worker count must be at least 1".to_string()));
        }

        *self = Self {
            phase: DistributorPhase::Dispatching,
            worker_count,
            finished: vec![false; worker_count],
            ..Self::default()
        };
        Ok(())
    }

    /// Pick the worker for the next record and advance the round-robin cursor.
    ///
    /// Returns `(worker, sequence)`, or `None` when records are not accepted.
    pub fn assign(&mut self) -> Option<(usize, usize)> {
        if self.phase != DistributorPhase::Dispatching {
            return None;
        }

        let worker = self.next_worker;
        let sequence = self.submitted;
        self.next_worker = (self.next_worker + 1) % self.worker_count;
        self.submitted += 1;
        Some((worker, sequence))
    }

    /// Close the input. Returns `true` when the end signal should be broadcast.
    pub fn end_of_input(&mut self) -> bool {
        if self.phase != DistributorPhase::Dispatching {
            return false;
        }

        self.end_of_input_received = true;
        self.phase = DistributorPhase::Draining;
        true
    }

    pub fn record_result(&mut self, result: &WorkerResult) -> ResultDisposition {
        let accepting_items = matches!(self.phase, DistributorPhase::Dispatching | DistributorPhase::Draining);

        match result {
            WorkerResult::Done { worker } => {
                if self.phase != DistributorPhase::Draining {
                    return ResultDisposition::Ignore;
                }
                match self.finished.get_mut(*worker) {
                    Some(finished) if !*finished => *finished = true,
                    _ => return ResultDisposition::Ignore
                }

                self.workers_done += 1;
                if self.workers_done == self.worker_count {
                    self.phase = DistributorPhase::Flushing;
                    ResultDisposition::Flush
                } else {
                    ResultDisposition::Drop
                }
            }
            _ if !accepting_items => ResultDisposition::Ignore,
            WorkerResult::Accepted { .. } => {
                self.accepted += 1;
                ResultDisposition::Forward
            }
            WorkerResult::Rejected { .. } => {
                self.rejected += 1;
                ResultDisposition::Drop
            }
            WorkerResult::Failed { .. } => {
                self.failed += 1;
                ResultDisposition::Drop
            }
        }
    }

    /// The collector's sequence arrived. Returns `true` exactly once.
    pub fn sequence_collected(&mut self) -> bool {
        if self.phase != DistributorPhase::Flushing {
            return false;
        }

        self.phase = DistributorPhase::Done;
        true
    }

    pub fn summary(&self, run_id: Uuid) -> RunSummary {
        RunSummary {
            run_id,
            workers: self.worker_count,
            submitted: self.submitted,
            accepted: self.accepted,
            rejected: self.rejected,
            failed: self.failed,
            rows_written: 0
        }
    }
}

/// Collector bookkeeping: append-only until the first flush, frozen afterwards
#[derive(Debug, Clone, Default)]
pub struct CollectorState {
    entries: Vec<CollectedEntry>,
    flushed: bool
}

impl CollectorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Returns `false` if the sequence is already frozen.
    pub fn append(&mut self, entry: CollectedEntry) -> bool {
        if self.flushed {
            return false;
        }

        self.entries.push(entry);
        true
    }

    /// Snapshot of the sequence. Freezes it on the first call.
    pub fn flush(&mut self) -> Vec<CollectedEntry> {
        self.flushed = true;
        self.entries.clone()
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
