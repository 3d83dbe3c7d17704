//! Worker Actor - transforms and filters one record per message
//!
//! Holds no state across items apart from its identity. The end signal is queued
//! behind every item sent to the same worker, so answering it with `Done` proves
//! everything before it has been classified and reported.

use std::sync::Arc;

use ractor::{Actor, ActorProcessingErr, ActorRef};
use tracing::{Level, event};

use crate::{
    actor::message::{DistributorMessage, WorkerMessage},
    domain::{
        constant::worker,
        record::{WorkItem, WorkerResult}
    },
    port::transform::Transform
};

pub struct WorkerArguments {
    pub index:       usize,
    pub distributor: ActorRef<DistributorMessage>,
    pub transform:   Arc<dyn Transform>
}

pub struct WorkerState {
    index:       usize,
    distributor: ActorRef<DistributorMessage>,
    transform:   Arc<dyn Transform>,
    /// Set after the end signal; the worker ignores everything afterwards
    ended:       bool
}

pub struct Worker;

#[async_trait::async_trait]
impl Actor for Worker {
    type Arguments = WorkerArguments;
    type Msg = WorkerMessage;
    type State = WorkerState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments
    ) -> Result<Self::State, ActorProcessingErr> {
        event!(Level::DEBUG, event = worker::WORKER_STARTED, worker = args.index);

        Ok(WorkerState { index: args.index, distributor: args.distributor, transform: args.transform, ended: false })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        if state.ended {
            event!(Level::WARN, event = worker::PROTOCOL_VIOLATION, worker = state.index,
                   message = ?message, reason = "message_after_end");
            return Ok(());
        }

        match message {
            WorkerMessage::Item(item) => self.handle_item(item, state).await,
            WorkerMessage::End => self.handle_end(state)
        }
    }
}

impl Worker {
    async fn handle_item(&self, item: WorkItem, state: &WorkerState) -> Result<(), ActorProcessingErr> {
        event!(Level::DEBUG, event = worker::ITEM_RECEIVED, worker = state.index, sequence = item.sequence);

        let result = Self::process(state.transform.as_ref(), item).await;

        event!(Level::DEBUG, event = worker::ITEM_CLASSIFIED, worker = state.index, result = ?result);
        Self::report(state, result);
        Ok(())
    }

    fn handle_end(&self, state: &mut WorkerState) -> Result<(), ActorProcessingErr> {
        event!(Level::DEBUG, event = worker::END_RECEIVED, worker = state.index);

        state.ended = true;
        Self::report(state, WorkerResult::Done { worker: state.index });
        Ok(())
    }

    /// Run the transform and classify its output.
    pub async fn process(transform: &dyn Transform, item: WorkItem) -> WorkerResult {
        match transform.transform(&item.record).await {
            Ok(value) => WorkerResult::classify(item, value),
            Err(e) => WorkerResult::Failed { worker: item.worker, sequence: item.sequence, reason: e.to_string() }
        }
    }

    fn report(state: &WorkerState, result: WorkerResult) {
        if let Err(e) = state.distributor.cast(DistributorMessage::WorkerResult(result)) {
            event!(Level::ERROR, event = worker::SEND_FAILED, worker = state.index, error = ?e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{error::PipelineError, record::Record};

    struct Fixed(&'static str);

    #[async_trait]
    impl Transform for Fixed {
        async fn transform(&self, _record: &Record) -> Result<String, PipelineError> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl Transform for Broken {
        async fn transform(&self, record: &Record) -> Result<String, PipelineError> {
            Err(PipelineError::Transform(format!("cannot hash {}", record.password)))
        }
    }

    /// Stands in for the Distributor and hands every worker result to the test
    struct Forward;

    #[async_trait]
    impl Actor for Forward {
        type Arguments = mpsc::UnboundedSender<WorkerResult>;
        type Msg = DistributorMessage;
        type State = mpsc::UnboundedSender<WorkerResult>;

        async fn pre_start(
            &self,
            _myself: ActorRef<Self::Msg>,
            results: Self::Arguments
        ) -> Result<Self::State, ActorProcessingErr> {
            Ok(results)
        }

        async fn handle(
            &self,
            _myself: ActorRef<Self::Msg>,
            message: Self::Msg,
            results: &mut Self::State
        ) -> Result<(), ActorProcessingErr> {
            if let DistributorMessage::WorkerResult(result) = message {
                let _ = results.send(result);
            }
            Ok(())
        }
    }

    fn item() -> WorkItem {
        WorkItem { worker: 1, sequence: 5, record: Record::new("X", 1, 2) }
    }

    #[tokio::test]
    async fn test_letter_prefix_is_accepted() {
        match Worker::process(&Fixed("xyz5"), item()).await {
            WorkerResult::Accepted { worker, sequence, value, record } => {
                assert_eq!((worker, sequence), (1, 5));
                assert_eq!(value, "xyz5");
                assert_eq!(record, Record::new("X", 1, 2));
            }
            other => panic!("Expected Accepted, got {:?}", other)
        }
    }

    #[tokio::test]
    async fn test_digit_prefix_is_rejected() {
        let result = Worker::process(&Fixed("5xyz"), item()).await;
        assert!(matches!(result, WorkerResult::Rejected { worker: 1, sequence: 5 }));
    }

    #[tokio::test]
    async fn test_transform_error_is_reported_as_failed() {
        match Worker::process(&Broken, item()).await {
            WorkerResult::Failed { worker, sequence, reason } => {
                assert_eq!((worker, sequence), (1, 5));
                assert!(reason.contains("cannot hash X"));
            }
            other => panic!("Expected Failed, got {:?}", other)
        }
    }

    #[tokio::test]
    async fn test_worker_ignores_everything_after_end() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (distributor, distributor_handle) = Actor::spawn(None, Forward, tx).await.unwrap();
        let (worker, worker_handle) = Actor::spawn(
            None,
            Worker,
            WorkerArguments { index: 0, distributor: distributor.clone(), transform: Arc::new(Fixed("abc")) }
        )
        .await
        .unwrap();

        let first = WorkItem { worker: 0, sequence: 0, record: Record::new("a", 1, 1) };
        let late = WorkItem { worker: 0, sequence: 1, record: Record::new("b", 2, 2) };
        worker.cast(WorkerMessage::Item(first)).unwrap();
        worker.cast(WorkerMessage::End).unwrap();
        worker.cast(WorkerMessage::Item(late)).unwrap();
        worker.cast(WorkerMessage::End).unwrap();

        match rx.recv().await.unwrap() {
            WorkerResult::Accepted { worker, sequence, value, .. } => {
                assert_eq!((worker, sequence), (0, 0));
                assert_eq!(value, "abc");
            }
            other => panic!("Expected Accepted, got {:?}", other)
        }
        assert!(matches!(rx.recv().await.unwrap(), WorkerResult::Done { worker: 0 }));
        assert!(tokio::time::timeout(Duration::from_millis(100), rx.recv()).await.is_err());

        worker.stop(None);
        distributor.stop(None);
        worker_handle.await.unwrap();
        distributor_handle.await.unwrap();
    }
}
