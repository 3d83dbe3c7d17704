//! Printer Actor - renders the final sequence and resolves the run
//!
//! Invoked once per run. The sink is opened on the first render; any sink failure
//! is fatal and reported through the run outcome rather than retried.

use ractor::{Actor, ActorProcessingErr, ActorRef};
use tracing::{Level, event};

use crate::{
    actor::message::{PrinterMessage, RunOutcome},
    domain::{
        constant::printer,
        error::PipelineError,
        record::CollectedEntry,
        report::{self, RunReport, RunSummary}
    },
    port::sink::ReportSink
};

pub struct PrinterState {
    /// Taken by the first render
    sink: Option<Box<dyn ReportSink>>
}

pub struct Printer;

#[async_trait::async_trait]
impl Actor for Printer {
    type Arguments = Box<dyn ReportSink>;
    type Msg = PrinterMessage;
    type State = PrinterState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        sink: Self::Arguments
    ) -> Result<Self::State, ActorProcessingErr> {
        event!(Level::DEBUG, event = printer::PRINTER_STARTED);

        Ok(PrinterState { sink: Some(sink) })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        match message {
            PrinterMessage::Render { entries, summary, outcome } => {
                self.handle_render(entries, summary, outcome, state).await
            }
        }
    }
}

impl Printer {
    async fn handle_render(
        &self,
        entries: Vec<CollectedEntry>,
        summary: RunSummary,
        outcome: RunOutcome,
        state: &mut PrinterState
    ) -> Result<(), ActorProcessingErr> {
        let result = match state.sink.take() {
            Some(mut sink) => Self::render(sink.as_mut(), entries, summary).await,
            None => {
                event!(Level::WARN, event = printer::PROTOCOL_VIOLATION, reason = "render_after_report");
                Err(PipelineError::Protocol("report already rendered".to_string()))
            }
        };

        match &result {
            Ok(report) => {
                event!(Level::INFO, event = printer::REPORT_WRITTEN, rows = report.summary.rows_written);
            }
            Err(PipelineError::SinkOpen(e)) => {
                event!(Level::ERROR, event = printer::SINK_OPEN_FAILED, error = %e);
            }
            Err(e) => {
                event!(Level::ERROR, event = printer::SINK_WRITE_FAILED, error = %e);
            }
        }

        if outcome.send(result).is_err() {
            event!(Level::WARN, event = printer::OUTCOME_DROPPED);
        }

        Ok(())
    }

    /// Write header and rows in sequence order.
    pub async fn render(
        sink: &mut dyn ReportSink,
        entries: Vec<CollectedEntry>,
        mut summary: RunSummary
    ) -> Result<RunReport, PipelineError> {
        sink.open().await.map_err(|e| PipelineError::SinkOpen(e.to_string()))?;

        let write_err = |e: std::io::Error| PipelineError::SinkWrite(e.to_string());

        sink.write(&report::header()).await.map_err(write_err)?;
        for entry in &entries {
            sink.write(&report::row(entry)).await.map_err(write_err)?;
            summary.rows_written += 1;
        }
        sink.close().await.map_err(write_err)?;

        Ok(RunReport { summary, entries })
    }
}
