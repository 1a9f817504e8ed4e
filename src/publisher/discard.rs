use super::{PublishError, Publisher, Sink};
use crate::record::Record;
use std::sync::atomic::{AtomicBool, Ordering};

/// Drops every record; used to measure raw generation throughput.
pub struct DiscardSink;

#[async_trait::async_trait]
impl Sink for DiscardSink {
    async fn create_publisher(&self, _client: &str) -> Result<Box<dyn Publisher>, PublishError> {
        Ok(Box::new(DiscardPublisher::default()))
    }
}

#[derive(Default)]
struct DiscardPublisher {
    closed: AtomicBool,
}

#[async_trait::async_trait]
impl Publisher for DiscardPublisher {
    async fn publish(&self, _record: Record) -> Result<(), PublishError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PublishError::Closed);
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), PublishError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
