//! In-memory sink over a bounded flume channel.
use super::{PublishError, Publisher, Sink};
use crate::record::Record;
use std::sync::Mutex;

/// Sink whose records land in a bounded channel owned by the caller.
///
/// A full channel blocks `publish` until the receiver catches up. Each
/// publisher holds its own sender, so the receiver observes disconnection
/// once every publisher is closed and the sink is shut down.
pub struct ChannelSink {
    tx: Mutex<Option<flume::Sender<Record>>>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, flume::Receiver<Record>) {
        let (tx, rx) = flume::bounded(capacity);
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    fn sender(&self) -> Option<flume::Sender<Record>> {
        self.tx.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait::async_trait]
impl Sink for ChannelSink {
    async fn create_publisher(&self, _client: &str) -> Result<Box<dyn Publisher>, PublishError> {
        let tx = self.sender().ok_or(PublishError::Closed)?;
        Ok(Box::new(ChannelPublisher {
            tx: Mutex::new(Some(tx)),
        }))
    }

    async fn shutdown(&self) -> Result<(), PublishError> {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
        Ok(())
    }
}

struct ChannelPublisher {
    tx: Mutex<Option<flume::Sender<Record>>>,
}

#[async_trait::async_trait]
impl Publisher for ChannelPublisher {
    async fn publish(&self, record: Record) -> Result<(), PublishError> {
        // Clone the sender so the lock is not held across the await
        let tx = self
            .tx
            .lock()
            .map_err(|_| PublishError::Other("publisher lock poisoned".into()))?
            .clone()
            .ok_or(PublishError::Closed)?;
        tx.send_async(record).await.map_err(|_| PublishError::Closed)
    }

    async fn close(&self) -> Result<(), PublishError> {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_records_in_order() {
        let (sink, rx) = ChannelSink::new(8);
        let publisher = sink.create_publisher("w0").await.unwrap();
        for i in 0..3 {
            publisher
                .publish(Record::new("filebeat", format!("m{i}"), i))
                .await
                .unwrap();
        }
        let got: Vec<_> = rx.drain().map(|r| r.message).collect();
        assert_eq!(got, vec!["m0", "m1", "m2"]);
    }

    #[tokio::test]
    async fn full_channel_blocks_publish() {
        let (sink, rx) = ChannelSink::new(1);
        let publisher = sink.create_publisher("w0").await.unwrap();
        publisher
            .publish(Record::new("filebeat", "a".into(), 0))
            .await
            .unwrap();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            publisher.publish(Record::new("filebeat", "b".into(), 1)),
        )
        .await;
        assert!(blocked.is_err(), "publish should wait for capacity");
        assert_eq!(rx.recv_async().await.unwrap().message, "a");
    }

    #[tokio::test]
    async fn receiver_disconnects_after_close_and_shutdown() {
        let (sink, rx) = ChannelSink::new(4);
        let publisher = sink.create_publisher("w0").await.unwrap();
        publisher.close().await.unwrap();
        publisher.close().await.unwrap();
        sink.shutdown().await.unwrap();
        assert!(rx.recv_async().await.is_err());
        assert!(sink.create_publisher("w1").await.is_err());
    }
}
