//! Domain Events - Structured events for internal monitoring and debugging

/// Pipeline run events
pub mod pipeline {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_COMPLETED: &str = "run.completed";
    pub const RUN_FAILED: &str = "run.failed";
    pub const RECORDS_SUBMITTED: &str = "records.submitted";
}

/// Distributor Actor Events
pub mod distributor {
    pub const DISTRIBUTOR_STARTED: &str = "distributor.started";
    pub const DISTRIBUTOR_STOPPED: &str = "distributor.stopped";
    pub const CHILDREN_SPAWNED: &str = "children.spawned";
    pub const CHILDREN_SPAWN_FAILED: &str = "children.spawn_failed";
    pub const CHILD_FAILED: &str = "child.failed";
    pub const RECORD_DISPATCHED: &str = "record.dispatched";
    pub const END_BROADCAST: &str = "end.broadcast";
    pub const RESULT_RECEIVED: &str = "result.received";
    pub const TRANSFORM_FAILED: &str = "transform.failed";
    pub const FLUSH_REQUESTED: &str = "flush.requested";
    pub const SEQUENCE_FORWARDED: &str = "sequence.forwarded";
    pub const PROTOCOL_VIOLATION: &str = "protocol.violation";
    pub const SEND_FAILED: &str = "send.failed";
}

/// Worker Actor Events
pub mod worker {
    pub const WORKER_STARTED: &str = "worker.started";
    pub const ITEM_RECEIVED: &str = "item.received";
    pub const ITEM_CLASSIFIED: &str = "item.classified";
    pub const END_RECEIVED: &str = "end.received";
    pub const PROTOCOL_VIOLATION: &str = "protocol.violation";
    pub const SEND_FAILED: &str = "send.failed";
}

/// Collector Actor Events
pub mod collector {
    pub const COLLECTOR_STARTED: &str = "collector.started";
    pub const ENTRY_APPENDED: &str = "entry.appended";
    pub const SEQUENCE_FLUSHED: &str = "sequence.flushed";
    pub const PROTOCOL_VIOLATION: &str = "protocol.violation";
    pub const SEND_FAILED: &str = "send.failed";
}

/// Printer Actor Events
pub mod printer {
    pub const PRINTER_STARTED: &str = "printer.started";
    pub const REPORT_WRITTEN: &str = "report.written";
    pub const SINK_OPEN_FAILED: &str = "sink.open_failed";
    pub const SINK_WRITE_FAILED: &str = "sink.write_failed";
    pub const PROTOCOL_VIOLATION: &str = "protocol.violation";
    pub const OUTCOME_DROPPED: &str = "outcome.dropped";
}
