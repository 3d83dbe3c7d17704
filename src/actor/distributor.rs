//! Distributor Actor - orchestrates a single run
//!
//! The Distributor sits at the root of a run's actor tree:
//! - Spawns the worker pool, the Collector and the Printer on `Begin`
//! - Routes records to workers round-robin
//! - Broadcasts the end signal once input is closed
//! - Counts `Done` reports and triggers the Collector flush exactly once
//! - Hands the collected sequence to the Printer
//!
//! Every transition rule lives in [`DistributorState`]; this actor only applies
//! the decisions and does the messaging. Mailboxes are unbounded: completion
//! detection relies on every dispatched record eventually reaching its worker.

use std::sync::Arc;

use ractor::{Actor, ActorProcessingErr, ActorRef, MessagingErr, SupervisionEvent};
use tracing::{Level, event};
use uuid::Uuid;

use crate::{
    actor::{
        collector::Collector,
        message::{CollectorMessage, DistributorMessage, PrinterMessage, RunOutcome, WorkerMessage},
        printer::Printer,
        worker::{Worker, WorkerArguments}
    },
    domain::{
        constant::distributor,
        error::PipelineError,
        record::{CollectedEntry, Record, WorkItem, WorkerResult},
        state::{DistributorState, ResultDisposition}
    },
    port::{sink::ReportSink, transform::Transform}
};

pub struct DistributorArguments {
    pub run_id:    Uuid,
    pub transform: Arc<dyn Transform>,
    pub sink:      Box<dyn ReportSink>,
    pub outcome:   RunOutcome
}

/// Distributor Actor State - protocol bookkeeping plus child references
pub struct DistributorRuntime {
    run_id:    Uuid,
    protocol:  DistributorState,
    transform: Arc<dyn Transform>,
    /// Handed to the Printer on `Begin`
    sink:      Option<Box<dyn ReportSink>>,
    /// Handed to the Printer with the final sequence, or resolved here on failure
    outcome:   Option<RunOutcome>,
    workers:   Vec<ActorRef<WorkerMessage>>,
    collector: Option<ActorRef<CollectorMessage>>,
    printer:   Option<ActorRef<PrinterMessage>>
}

pub struct Distributor;

#[async_trait::async_trait]
impl Actor for Distributor {
    type Arguments = DistributorArguments;
    type Msg = DistributorMessage;
    type State = DistributorRuntime;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments
    ) -> Result<Self::State, ActorProcessingErr> {
        event!(Level::DEBUG, event = distributor::DISTRIBUTOR_STARTED, run_id = %args.run_id);

        Ok(DistributorRuntime {
            run_id:    args.run_id,
            protocol:  DistributorState::new(),
            transform: args.transform,
            sink:      Some(args.sink),
            outcome:   Some(args.outcome),
            workers:   Vec::new(),
            collector: None,
            printer:   None
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DistributorMessage::Begin { worker_count } => self.handle_begin(myself, worker_count, state).await,
            DistributorMessage::Record(record) => self.handle_record(record, state),
            DistributorMessage::EndOfInput => self.handle_end_of_input(state),
            DistributorMessage::WorkerResult(result) => self.handle_worker_result(result, state),
            DistributorMessage::Collected(entries) => self.handle_collected(entries, state)
        }
    }

    async fn handle_supervisor_evt(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        if let SupervisionEvent::ActorFailed(cell, reason) = message {
            let name = cell.get_name().unwrap_or_else(|| cell.get_id().to_string());
            event!(Level::ERROR, event = distributor::CHILD_FAILED, run_id = %state.run_id, actor = %name, error = %reason);

            Self::fail(state, PipelineError::Actor(format!("{} failed: {}", name, reason)));
        }

        Ok(())
    }

    async fn post_stop(&self, _myself: ActorRef<Self::Msg>, state: &mut Self::State) -> Result<(), ActorProcessingErr> {
        for worker in state.workers.drain(..) {
            worker.stop(None);
        }
        if let Some(collector) = state.collector.take() {
            collector.stop(None);
        }
        if let Some(printer) = state.printer.take() {
            printer.stop(None);
        }

        Self::fail(state, PipelineError::Actor("distributor stopped before the report was written".to_string()));

        event!(Level::DEBUG, event = distributor::DISTRIBUTOR_STOPPED, run_id = %state.run_id,
               phase = ?state.protocol.phase());
        Ok(())
    }
}

impl Distributor {
    async fn handle_begin(
        &self,
        myself: ActorRef<DistributorMessage>,
        worker_count: usize,
        state: &mut DistributorRuntime
    ) -> Result<(), ActorProcessingErr> {
        match state.protocol.begin(worker_count) {
            Ok(()) => {}
            Err(PipelineError::Protocol(reason)) => {
                event!(Level::WARN, event = distributor::PROTOCOL_VIOLATION, run_id = %state.run_id, reason = %reason);
                return Ok(());
            }
            Err(e) => {
                Self::fail(state, e);
                return Ok(());
            }
        }

        match Self::spawn_children(&myself, worker_count, state).await {
            Ok(()) => {
                event!(Level::INFO, event = distributor::CHILDREN_SPAWNED, run_id = %state.run_id,
                       workers = worker_count);
            }
            Err(e) => {
                event!(Level::ERROR, event = distributor::CHILDREN_SPAWN_FAILED, run_id = %state.run_id, error = %e);
                Self::fail(state, e);
            }
        }

        Ok(())
    }

    async fn spawn_children(
        myself: &ActorRef<DistributorMessage>,
        worker_count: usize,
        state: &mut DistributorRuntime
    ) -> Result<(), PipelineError> {
        let supervisor = myself.get_cell();

        let (collector, _handle) = Actor::spawn_linked(
            Some(format!("collector-{}", state.run_id)),
            Collector,
            myself.clone(),
            supervisor.clone()
        )
        .await?;
        state.collector = Some(collector);

        let sink = state.sink.take().ok_or_else(|| PipelineError::Protocol("report sink already in use".to_string()))?;
        let (printer, _handle) =
            Actor::spawn_linked(Some(format!("printer-{}", state.run_id)), Printer, sink, supervisor.clone()).await?;
        state.printer = Some(printer);

        for index in 0..worker_count {
            let args = WorkerArguments { index, distributor: myself.clone(), transform: state.transform.clone() };
            let (worker, _handle) = Actor::spawn_linked(
                Some(format!("worker-{}-{}", index + 1, state.run_id)),
                Worker,
                args,
                supervisor.clone()
            )
            .await?;
            state.workers.push(worker);
        }

        Ok(())
    }

    fn handle_record(&self, record: Record, state: &mut DistributorRuntime) -> Result<(), ActorProcessingErr> {
        let Some((worker, sequence)) = state.protocol.assign() else {
            event!(Level::WARN, event = distributor::PROTOCOL_VIOLATION, run_id = %state.run_id,
                   phase = ?state.protocol.phase(), reason = "record_not_accepted");
            return Ok(());
        };

        event!(Level::DEBUG, event = distributor::RECORD_DISPATCHED, worker = worker, sequence = sequence);

        match state.workers.get(worker) {
            Some(target) => {
                if let Err(e) = target.cast(WorkerMessage::Item(WorkItem { worker, sequence, record })) {
                    event!(Level::ERROR, event = distributor::SEND_FAILED, worker = worker, error = ?e);
                }
            }
            None => {
                event!(Level::ERROR, event = distributor::SEND_FAILED, worker = worker, reason = "worker_missing");
            }
        }

        Ok(())
    }

    fn handle_end_of_input(&self, state: &mut DistributorRuntime) -> Result<(), ActorProcessingErr> {
        if !state.protocol.end_of_input() {
            event!(Level::WARN, event = distributor::PROTOCOL_VIOLATION, run_id = %state.run_id,
                   phase = ?state.protocol.phase(), reason = "unexpected_end_of_input");
            return Ok(());
        }

        for (index, worker) in state.workers.iter().enumerate() {
            if let Err(e) = worker.cast(WorkerMessage::End) {
                event!(Level::ERROR, event = distributor::SEND_FAILED, worker = index, error = ?e);
            }
        }

        event!(Level::DEBUG, event = distributor::END_BROADCAST, run_id = %state.run_id,
               workers = state.workers.len());
        Ok(())
    }

    fn handle_worker_result(
        &self,
        result: WorkerResult,
        state: &mut DistributorRuntime
    ) -> Result<(), ActorProcessingErr> {
        match state.protocol.record_result(&result) {
            ResultDisposition::Forward => {
                if let WorkerResult::Accepted { worker, sequence, value, record } = result {
                    Self::send_to_collector(
                        state,
                        CollectorMessage::Accepted(CollectedEntry { value, record, worker, sequence })
                    );
                }
            }
            ResultDisposition::Drop => match result {
                WorkerResult::Failed { worker, sequence, reason } => {
                    event!(Level::WARN, event = distributor::TRANSFORM_FAILED, worker = worker,
                           sequence = sequence, reason = %reason);
                }
                other => {
                    event!(Level::DEBUG, event = distributor::RESULT_RECEIVED, result = ?other,
                           workers_done = state.protocol.workers_done());
                }
            },
            ResultDisposition::Flush => {
                event!(Level::DEBUG, event = distributor::FLUSH_REQUESTED, run_id = %state.run_id,
                       workers_done = state.protocol.workers_done());
                Self::send_to_collector(state, CollectorMessage::Flush);
            }
            ResultDisposition::Ignore => {
                event!(Level::WARN, event = distributor::PROTOCOL_VIOLATION, run_id = %state.run_id,
                       worker = result.worker(), phase = ?state.protocol.phase(), result = ?result,
                       reason = "unexpected_worker_result");
            }
        }

        Ok(())
    }

    fn handle_collected(
        &self,
        entries: Vec<CollectedEntry>,
        state: &mut DistributorRuntime
    ) -> Result<(), ActorProcessingErr> {
        if !state.protocol.sequence_collected() {
            event!(Level::WARN, event = distributor::PROTOCOL_VIOLATION, run_id = %state.run_id,
                   phase = ?state.protocol.phase(), reason = "unexpected_sequence");
            return Ok(());
        }

        let summary = state.protocol.summary(state.run_id);
        let Some(outcome) = state.outcome.take() else {
            event!(Level::WARN, event = distributor::PROTOCOL_VIOLATION, run_id = %state.run_id,
                   reason = "run_already_resolved");
            return Ok(());
        };
        let Some(printer) = state.printer.as_ref() else {
            let _ = outcome.send(Err(PipelineError::Protocol("no printer to hand the sequence to".to_string())));
            return Ok(());
        };

        event!(Level::DEBUG, event = distributor::SEQUENCE_FORWARDED, run_id = %state.run_id,
               entries = entries.len());

        match printer.cast(PrinterMessage::Render { entries, summary, outcome }) {
            Ok(()) => {}
            Err(MessagingErr::SendErr(PrinterMessage::Render { outcome, .. })) => {
                event!(Level::ERROR, event = distributor::SEND_FAILED, actor = "printer");
                let _ = outcome.send(Err(PipelineError::Actor("printer mailbox closed".to_string())));
            }
            Err(e) => {
                event!(Level::ERROR, event = distributor::SEND_FAILED, actor = "printer", error = ?e);
            }
        }

        Ok(())
    }

    fn send_to_collector(state: &DistributorRuntime, message: CollectorMessage) {
        match &state.collector {
            Some(collector) => {
                if let Err(e) = collector.cast(message) {
                    event!(Level::ERROR, event = distributor::SEND_FAILED, actor = "collector", error = ?e);
                }
            }
            None => {
                event!(Level::ERROR, event = distributor::SEND_FAILED, actor = "collector", reason = "collector_missing");
            }
        }
    }

    /// Resolve the run with an error if nobody has resolved it yet.
    fn fail(state: &mut DistributorRuntime, error: PipelineError) {
        if let Some(outcome) = state.outcome.take() {
            let _ = outcome.send(Err(error));
        }
    }
}
