//! Run orchestration
//!
//! Spawns a Distributor for one batch, submits every record followed by the
//! end-of-input signal, and waits for the Printer to resolve the run. Each run gets
//! its own id so actor names stay unique in the global registry.

use std::sync::Arc;

use ractor::{Actor, ActorRef};
use tokio::sync::oneshot;
use tracing::{Level, event};
use uuid::Uuid;

use crate::{
    actor::{Distributor, DistributorArguments, DistributorMessage},
    domain::{constant::pipeline, error::PipelineError, record::Record, report::RunReport},
    port::{sink::ReportSink, transform::Transform}
};

pub struct Pipeline {
    worker_count: usize,
    transform:    Arc<dyn Transform>,
    sink:         Box<dyn ReportSink>
}

impl Pipeline {
    pub fn new(worker_count: usize, transform: Arc<dyn Transform>, sink: Box<dyn ReportSink>) -> Self {
        Self { worker_count, transform, sink }
    }

    /// Process the batch and write the report.
    pub async fn run(self, records: Vec<Record>) -> Result<RunReport, PipelineError> {
        if self.worker_count == 0 {
            return Err(PipelineError::Configuration("worker count must be at least 1".to_string()));
        }

        let run_id = Uuid::new_v4();
        let (outcome, outcome_rx) = oneshot::channel();

        event!(Level::INFO, event = pipeline::RUN_STARTED, run_id = %run_id,
               workers = self.worker_count, records = records.len());

        let (distributor, handle) = Actor::spawn(
            Some(format!("distributor-{}", run_id)),
            Distributor,
            DistributorArguments { run_id, transform: self.transform, sink: self.sink, outcome }
        )
        .await?;

        let result = match Self::submit(&distributor, self.worker_count, records) {
            Ok(()) => outcome_rx
                .await
                .unwrap_or_else(|_| Err(PipelineError::Actor("run ended without an outcome".to_string()))),
            Err(e) => Err(e)
        };

        distributor.stop(None);
        if let Err(e) = handle.await {
            event!(Level::WARN, event = pipeline::RUN_FAILED, run_id = %run_id, error = %e,
                   message = "distributor_join_failed");
        }

        match &result {
            Ok(report) => {
                let summary = &report.summary;
                event!(Level::INFO, event = pipeline::RUN_COMPLETED, run_id = %run_id,
                       submitted = summary.submitted, accepted = summary.accepted,
                       rejected = summary.rejected, failed = summary.failed, rows = summary.rows_written);
            }
            Err(e) => {
                event!(Level::ERROR, event = pipeline::RUN_FAILED, run_id = %run_id, error = %e);
            }
        }

        result
    }

    fn submit(
        distributor: &ActorRef<DistributorMessage>,
        worker_count: usize,
        records: Vec<Record>
    ) -> Result<(), PipelineError> {
        let send = |message: DistributorMessage| {
            distributor.cast(message).map_err(|e| PipelineError::Actor(format!("distributor unreachable: {:?}", e)))
        };

        let count = records.len();
        send(DistributorMessage::Begin { worker_count })?;
        for record in records {
            send(DistributorMessage::Record(record))?;
        }
        send(DistributorMessage::EndOfInput)?;

        event!(Level::DEBUG, event = pipeline::RECORDS_SUBMITTED, records = count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, HashSet},
        io,
        time::Duration
    };

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        adapter::{
            sink::{FileSink, MemorySink},
            transform::Base64Transform
        },
        domain::report
    };

    /// Returns a fixed value per password after `passes` milliseconds
    struct Scripted {
        values: HashMap<String, String>
    }

    impl Scripted {
        fn new(pairs: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self { values: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() })
        }
    }

    #[async_trait]
    impl Transform for Scripted {
        async fn transform(&self, record: &Record) -> Result<String, PipelineError> {
            tokio::time::sleep(Duration::from_millis(record.passes.unsigned_abs() % 7)).await;
            self.values
                .get(&record.password)
                .cloned()
                .ok_or_else(|| PipelineError::Transform(format!("no value for {}", record.password)))
        }
    }

    struct ReadOnlySink;

    #[async_trait]
    impl ReportSink for ReadOnlySink {
        async fn open(&mut self) -> io::Result<()> {
            Ok(())
        }

        async fn write(&mut self, _chunk: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        async fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Panics on one password, taking its worker down mid-item
    struct Exploding;

    #[async_trait]
    impl Transform for Exploding {
        async fn transform(&self, record: &Record) -> Result<String, PipelineError> {
            if record.password == "boom" {
                panic!("transform exploded on {}", record.password);
            }
            Ok(format!("h{}", record.password))
        }
    }

    fn data_rows(contents: &str) -> Vec<String> {
        assert!(contents.starts_with(&report::header()), "report must start with the header");
        contents[report::header().len()..].lines().map(str::to_string).collect()
    }

    fn sorted(mut rows: Vec<String>) -> Vec<String> {
        rows.sort();
        rows
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_four_records_two_workers() {
        let records = vec![Record::new("a", 1, 1), Record::new("b", 2, 2), Record::new("c", 3, 3), Record::new("d", 4, 4)];
        let transform = Scripted::new(&[("a", "hashA"), ("b", "hashB"), ("c", "hashC"), ("d", "hashD")]);
        let sink = MemorySink::new();

        let report = Pipeline::new(2, transform, Box::new(sink.clone())).run(records.clone()).await.unwrap();

        assert_eq!(report.summary.workers, 2);
        assert_eq!(report.summary.submitted, 4);
        assert_eq!(report.summary.accepted, 4);
        assert_eq!(report.summary.rejected, 0);
        assert_eq!(report.summary.rows_written, 4);

        // Worker 0 handles indices 0 and 2, worker 1 handles 1 and 3
        let routing: HashMap<usize, usize> = report.entries.iter().map(|e| (e.sequence, e.worker)).collect();
        assert_eq!(routing, HashMap::from([(0, 0), (1, 1), (2, 0), (3, 1)]));
        for entry in &report.entries {
            assert_eq!(entry.record, records[entry.sequence]);
        }

        let expected: Vec<String> = [("a", 1, "hashA"), ("b", 2, "hashB"), ("c", 3, "hashC"), ("d", 4, "hashD")]
            .iter()
            .map(|(p, n, v)| format!("{:>30}{:>20}{:>20}{:>50}", p, n, n, v))
            .collect();
        assert_eq!(sorted(data_rows(&sink.contents().await)), sorted(expected));
    }

    #[tokio::test]
    async fn test_digit_prefixed_values_are_filtered_out() {
        let records = vec![Record::new("X", 1, 0), Record::new("Y", 2, 0)];
        let transform = Scripted::new(&[("X", "5xyz"), ("Y", "xyz5")]);
        let sink = MemorySink::new();

        let report = Pipeline::new(2, transform, Box::new(sink.clone())).run(records).await.unwrap();

        assert_eq!(report.summary.accepted, 1);
        assert_eq!(report.summary.rejected, 1);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].value, "xyz5");

        let contents = sink.contents().await;
        assert!(!contents.contains("5xyz"));
        assert_eq!(data_rows(&contents), vec![format!("{:>30}{:>20}{:>20}{:>50}", "Y", 2, 0, "xyz5")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_record_classified_exactly_once() {
        let records: Vec<Record> = (0..60)
            .map(|i| if i % 4 == 0 { Record::new("ш", i, 2 - i) } else { Record::new(format!("pw{}", i), i, i * 3) })
            .collect();
        let sink = MemorySink::new();

        let report = Pipeline::new(7, Arc::new(Base64Transform::new()), Box::new(sink.clone()))
            .run(records.clone())
            .await
            .unwrap();

        let summary = &report.summary;
        assert_eq!(summary.submitted, 60);
        assert_eq!(summary.accepted + summary.rejected + summary.failed, 60);
        assert_eq!(summary.rejected, 15);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.rows_written, summary.accepted);

        let sequences: HashSet<usize> = report.entries.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences.len(), report.entries.len());
        for entry in &report.entries {
            assert_eq!(entry.worker, entry.sequence % 7);
            assert_eq!(entry.record, records[entry.sequence]);
            assert!(!entry.value.starts_with(|c: char| c.is_ascii_digit()));
        }

        assert_eq!(data_rows(&sink.contents().await).len(), summary.accepted);
    }

    #[tokio::test]
    async fn test_empty_input_still_reaches_the_printer() {
        let sink = MemorySink::new();

        let report = Pipeline::new(3, Scripted::new(&[]), Box::new(sink.clone())).run(vec![]).await.unwrap();

        assert_eq!(report.summary.submitted, 0);
        assert!(report.entries.is_empty());
        assert_eq!(sink.contents().await, report::header());
    }

    #[tokio::test]
    async fn test_more_workers_than_records() {
        let records = vec![Record::new("a", 1, 1), Record::new("b", 2, 2)];
        let sink = MemorySink::new();

        let report =
            Pipeline::new(5, Arc::new(Base64Transform::new()), Box::new(sink.clone())).run(records).await.unwrap();

        assert_eq!(report.summary.workers, 5);
        assert_eq!(report.summary.accepted, 2);
        let values: HashSet<&str> = report.entries.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, HashSet::from(["YTI", "YjQ"]));
    }

    #[tokio::test]
    async fn test_failed_transforms_are_counted_not_printed() {
        let records = vec![Record::new("known", 1, 1), Record::new("unknown", 2, 2), Record::new("also", 3, 3)];
        let transform = Scripted::new(&[("known", "k1"), ("also", "a3")]);
        let sink = MemorySink::new();

        let report = Pipeline::new(2, transform, Box::new(sink.clone())).run(records).await.unwrap();

        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.accepted, 2);
        assert!(!sink.contents().await.contains("unknown"));
    }

    #[tokio::test]
    async fn test_unopenable_output_fails_with_sink_open() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("no-such-dir").join("report.txt"));

        let err = Pipeline::new(2, Arc::new(Base64Transform::new()), Box::new(sink))
            .run(vec![Record::new("a", 1, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::SinkOpen(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_fails_with_sink_write() {
        let err = Pipeline::new(1, Arc::new(Base64Transform::new()), Box::new(ReadOnlySink))
            .run(vec![Record::new("a", 1, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::SinkWrite(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_file_report_matches_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");

        Pipeline::new(1, Arc::new(Base64Transform::new()), Box::new(FileSink::new(&path)))
            .run(vec![Record::new("a", 1, 1)])
            .await
            .unwrap();

        let expected = format!("{}{:>30}{:>20}{:>20}{:>50}\n", report::header(), "a", 1, 1, "YTI");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_worker_panic_fails_the_run() {
        let sink = MemorySink::new();
        let records = vec![Record::new("a", 1, 1), Record::new("boom", 2, 2), Record::new("c", 3, 3)];

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            Pipeline::new(2, Arc::new(Exploding), Box::new(sink.clone())).run(records)
        )
        .await
        .expect("a dead worker must not hang the run");

        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::Actor(_)), "unexpected error: {:?}", err);
        assert_eq!(err.exit_code(), 3);
        assert!(sink.contents().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_workers_is_rejected() {
        let err = Pipeline::new(0, Arc::new(Base64Transform::new()), Box::new(MemorySink::new()))
            .run(vec![Record::new("a", 1, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_runs_do_not_collide() {
        let first = Pipeline::new(2, Arc::new(Base64Transform::new()), Box::new(MemorySink::new()))
            .run(vec![Record::new("a", 1, 1), Record::new("b", 2, 2)]);
        let second = Pipeline::new(2, Arc::new(Base64Transform::new()), Box::new(MemorySink::new()))
            .run(vec![Record::new("c", 3, 3)]);

        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap().summary.accepted, 2);
        assert_eq!(second.unwrap().summary.accepted, 1);
    }
}
