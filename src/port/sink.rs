use std::io;

use async_trait::async_trait;

/// Append-only text stream the printer writes the report to
///
/// Opened once per run. The printer maps a failed `open` and a failed
/// `write`/`close` to different fatal errors.
#[async_trait]
pub trait ReportSink: Send + Sync + 'static {
    async fn open(&mut self) -> io::Result<()>;

    async fn write(&mut self, chunk: &str) -> io::Result<()>;

    /// Flush anything buffered
    async fn close(&mut self) -> io::Result<()>;
}
