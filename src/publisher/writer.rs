//! JSON-lines sinks over stdout or a file.
use super::{PublishError, Publisher, Sink};
use crate::record::Record;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

type SharedWriter = Arc<Mutex<BufWriter<Box<dyn AsyncWrite + Send + Unpin>>>>;

/// Writes each record as one JSON line. All publishers share the writer, so
/// lines from different workers interleave but never tear.
pub struct WriterSink {
    writer: SharedWriter,
}

impl WriterSink {
    pub fn stdout() -> Self {
        tracing::info!("Writing records to stdout");
        Self::from_writer(Box::new(tokio::io::stdout()))
    }

    pub async fn file(path: &str) -> Result<Self, PublishError> {
        // Ensure parent directory exists
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        tracing::info!(path, "Writing records to file");
        Ok(Self::from_writer(Box::new(file)))
    }

    pub fn from_writer(writer: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(BufWriter::new(writer))),
        }
    }
}

#[async_trait::async_trait]
impl Sink for WriterSink {
    async fn create_publisher(&self, _client: &str) -> Result<Box<dyn Publisher>, PublishError> {
        Ok(Box::new(WriterPublisher {
            writer: Arc::clone(&self.writer),
            closed: AtomicBool::new(false),
        }))
    }

    async fn shutdown(&self) -> Result<(), PublishError> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

struct WriterPublisher {
    writer: SharedWriter,
    closed: AtomicBool,
}

#[async_trait::async_trait]
impl Publisher for WriterPublisher {
    async fn publish(&self, record: Record) -> Result<(), PublishError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PublishError::Closed);
        }
        let line = record.encode()?;
        let mut w = self.writer.lock().await;
        w.write_all(&line).await?;
        w.write_all(b"\n").await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), PublishError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}
