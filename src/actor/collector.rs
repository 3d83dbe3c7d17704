//! Collector Actor - accumulates accepted results until the distributor asks for them

use ractor::{Actor, ActorProcessingErr, ActorRef};
use tracing::{Level, event};

use crate::{
    actor::message::{CollectorMessage, DistributorMessage},
    domain::{constant::collector, record::CollectedEntry, state::CollectorState}
};

pub struct CollectorActorState {
    distributor: ActorRef<DistributorMessage>,
    sequence:    CollectorState
}

pub struct Collector;

#[async_trait::async_trait]
impl Actor for Collector {
    type Arguments = ActorRef<DistributorMessage>;
    type Msg = CollectorMessage;
    type State = CollectorActorState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        distributor: Self::Arguments
    ) -> Result<Self::State, ActorProcessingErr> {
        event!(Level::DEBUG, event = collector::COLLECTOR_STARTED);

        Ok(CollectorActorState { distributor, sequence: CollectorState::new() })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        match message {
            CollectorMessage::Accepted(entry) => self.handle_accepted(entry, state),
            CollectorMessage::Flush => self.handle_flush(state)
        }
    }
}

impl Collector {
    fn handle_accepted(&self, entry: CollectedEntry, state: &mut CollectorActorState) -> Result<(), ActorProcessingErr> {
        let sequence = entry.sequence;

        if state.sequence.append(entry) {
            event!(Level::DEBUG, event = collector::ENTRY_APPENDED, sequence = sequence, total = state.sequence.len());
        } else {
            event!(Level::WARN, event = collector::PROTOCOL_VIOLATION, sequence = sequence,
                   reason = "entry_after_flush");
        }

        Ok(())
    }

    fn handle_flush(&self, state: &mut CollectorActorState) -> Result<(), ActorProcessingErr> {
        if state.sequence.is_flushed() {
            event!(Level::WARN, event = collector::PROTOCOL_VIOLATION, reason = "repeated_flush_resending_snapshot");
        }

        let entries = state.sequence.flush();
        event!(Level::DEBUG, event = collector::SEQUENCE_FLUSHED, entries = entries.len());

        if let Err(e) = state.distributor.cast(DistributorMessage::Collected(entries)) {
            event!(Level::ERROR, event = collector::SEND_FAILED, error = ?e);
        }

        Ok(())
    }
}
