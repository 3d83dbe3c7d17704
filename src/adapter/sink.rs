//! Report sink implementations
//!
//! - FileSink: creates (or truncates) a text file on open
//! - MemorySink: keeps the report in memory, for tests and embedding

use std::{
    io,
    path::PathBuf,
    sync::Arc
};

use async_trait::async_trait;
use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
    sync::RwLock
};

use crate::port::sink::ReportSink;

/// File-backed sink
pub struct FileSink {
    path:   PathBuf,
    writer: Option<BufWriter<File>>
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), writer: None }
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer.as_mut().ok_or_else(|| io::Error::other(format!("{} is not open", self.path.display())))
    }
}

#[async_trait]
impl ReportSink for FileSink {
    async fn open(&mut self) -> io::Result<()> {
        let file = File::create(&self.path)
            .await
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", self.path.display(), e)))?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    async fn write(&mut self, chunk: &str) -> io::Result<()> {
        self.writer()?.write_all(chunk.as_bytes()).await
    }

    async fn close(&mut self) -> io::Result<()> {
        let writer = self.writer()?;
        writer.flush().await?;
        writer.get_mut().sync_all().await
    }
}

/// In-memory sink; clones share the same buffer
#[derive(Clone, Default)]
pub struct MemorySink {
    buffer: Arc<RwLock<String>>
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contents(&self) -> String {
        self.buffer.read().await.clone()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn open(&mut self) -> io::Result<()> {
        self.buffer.write().await.clear();
        Ok(())
    }

    async fn write(&mut self, chunk: &str) -> io::Result<()> {
        self.buffer.write().await.push_str(chunk);
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
