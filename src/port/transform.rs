use async_trait::async_trait;

use crate::domain::{error::PipelineError, record::Record};

/// Per-record transform applied by workers
///
/// Implementations may be slow or asynchronous; a worker awaits one call at a time
/// while other workers keep running. Errors surface as `WorkerResult::Failed`.
#[async_trait]
pub trait Transform: Send + Sync + 'static {
    async fn transform(&self, record: &Record) -> Result<String, PipelineError>;
}
