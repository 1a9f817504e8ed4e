//! Publisher abstraction: sink and publisher traits, error type, and builder factory.

pub mod channel;
pub mod config;
pub mod discard;
pub mod writer;

use crate::record::Record;
use std::collections::BTreeMap;

pub use channel::ChannelSink;
pub use config::{parse_sink_kind, parse_sink_kv};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkKind {
    Stdout,
    File,
    Discard,
}

#[derive(Clone, Debug, Default)]
pub struct SinkOptions {
    pub params: BTreeMap<String, String>,
}

impl SinkOptions {
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error("connect: {0}")]
    Connect(String),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("publisher closed")]
    Closed,
    #[error("other: {0}")]
    Other(String),
}

/// Downstream destination for records. Hands out one publisher per worker.
#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    async fn create_publisher(&self, client: &str) -> Result<Box<dyn Publisher>, PublishError>;
    /// Flush and release the sink once every publisher is closed
    async fn shutdown(&self) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Per-worker publishing handle.
///
/// `publish` may block to apply backpressure. `close` is idempotent; any
/// publish after it fails with [`PublishError::Closed`].
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, record: Record) -> Result<(), PublishError>;
    async fn close(&self) -> Result<(), PublishError>;
}

pub struct SinkBuilder;

impl SinkBuilder {
    pub async fn connect(kind: SinkKind, opts: SinkOptions) -> Result<Box<dyn Sink>, PublishError> {
        match kind {
            SinkKind::Stdout => Ok(Box::new(writer::WriterSink::stdout())),
            SinkKind::File => {
                let path = opts
                    .params
                    .get("path")
                    .ok_or_else(|| PublishError::Connect("file sink requires a path".into()))?;
                Ok(Box::new(writer::WriterSink::file(path).await?))
            }
            SinkKind::Discard => Ok(Box::new(discard::DiscardSink)),
        }
    }
}
