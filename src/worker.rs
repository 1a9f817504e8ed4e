//! Worker: owns one record generator and streams its output into a publisher.
//!
//! The loop is strictly sequential: check shutdown, generate, publish, repeat.
//! The shutdown token is polled once per iteration and never raced against an
//! in-flight publish, so a publish that has started always completes.

use crate::generators::RecordGenerator;
use crate::metrics::stats::Stats;
use crate::publisher::{PublishError, Publisher};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkerState {
    #[default]
    Created,
    Running,
    Stopped,
}

#[derive(thiserror::Error, Debug)]
pub enum WorkerError {
    #[error("worker {worker_id} publish failed: {source}")]
    Publish {
        worker_id: usize,
        #[source]
        source: PublishError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker_id: usize,
    pub kind: String,
    pub published: u64,
    pub bytes: u64,
    /// `Stopped` once `run` has returned
    pub state: WorkerState,
}

pub struct Worker {
    id: usize,
    generator: Box<dyn RecordGenerator>,
    shutdown: CancellationToken,
    /// Per-worker emission cap; `None` runs until shutdown
    max_events: Option<u64>,
    stats: Option<Arc<Stats>>,
}

impl Worker {
    pub fn new(
        id: usize,
        generator: Box<dyn RecordGenerator>,
        shutdown: CancellationToken,
        max_events: Option<u64>,
    ) -> Self {
        Self {
            id,
            generator,
            shutdown,
            max_events,
            stats: None,
        }
    }

    /// Report every publish into a shared collector
    pub fn with_stats(mut self, stats: Arc<Stats>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> &str {
        self.generator.kind()
    }

    /// A worker that has not been run is always `Created`; `run` consumes it.
    pub fn state(&self) -> WorkerState {
        WorkerState::Created
    }

    /// Publish records until shutdown fires or the cap is reached.
    ///
    /// Closes `publisher` on the way out, after the last publish returned.
    pub async fn run(mut self, publisher: Box<dyn Publisher>) -> Result<WorkerStats, WorkerError> {
        let mut stats = WorkerStats {
            worker_id: self.id,
            kind: self.generator.kind().to_string(),
            state: WorkerState::Running,
            ..Default::default()
        };
        let mut remaining = self.max_events;
        tracing::debug!(worker_id = self.id, kind = %stats.kind, state = ?stats.state, "Worker started");

        let result = loop {
            if self.shutdown.is_cancelled() {
                tracing::debug!(worker_id = self.id, "Worker observed shutdown signal");
                break Ok(());
            }
            if remaining == Some(0) {
                tracing::debug!(worker_id = self.id, published = stats.published, "Worker reached event cap");
                break Ok(());
            }

            let record = self.generator.generate();
            let bytes = record.len() as u64;
            let started = Instant::now();
            match publisher.publish(record).await {
                Ok(()) => {
                    stats.published += 1;
                    stats.bytes += bytes;
                    if let Some(shared) = &self.stats {
                        shared.record_published(bytes, started.elapsed()).await;
                    }
                }
                Err(source) => {
                    if let Some(shared) = &self.stats {
                        shared.record_error().await;
                    }
                    break Err(WorkerError::Publish {
                        worker_id: self.id,
                        source,
                    });
                }
            }
            if let Some(n) = remaining.as_mut() {
                *n -= 1;
            }
        };

        if let Err(e) = publisher.close().await {
            tracing::warn!(worker_id = self.id, error = %e, "Failed to close publisher");
        }
        stats.state = WorkerState::Stopped;
        tracing::debug!(
            worker_id = self.id,
            published = stats.published,
            bytes = stats.bytes,
            state = ?stats.state,
            "Worker finished"
        );

        result.map(|()| stats)
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("kind", &self.generator.kind())
            .field("max_events", &self.max_events)
            .finish()
    }
}
