//! Orchestrator: resolves the configuration into workers, runs them
//! concurrently, and coordinates shutdown.

use crate::config::BeatConfig;
use crate::generators::{GeneratorError, GeneratorRegistry};
use crate::metrics::stats::Stats;
use crate::publisher::{PublishError, Publisher, Sink};
use crate::worker::{Worker, WorkerStats};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Emission cap applied to every worker independently
    pub max_events: Option<u64>,
    /// Period of the throughput log line; `None` disables it
    pub stats_interval: Option<Duration>,
}

impl RunOptions {
    /// Interpret a signed `--max` flag: unset or negative means unbounded
    pub fn with_max_flag(mut self, max: Option<i64>) -> Self {
        self.max_events = match max {
            Some(v) if v >= 0 => Some(v as u64),
            _ => None,
        };
        self
    }

    pub fn with_stats_interval(mut self, every: Duration) -> Self {
        self.stats_interval = Some(every);
        self
    }
}

#[derive(Debug)]
pub struct WorkerFailure {
    pub worker_id: usize,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub workers: Vec<WorkerStats>,
    pub failures: Vec<WorkerFailure>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_published(&self) -> u64 {
        self.workers.iter().map(|w| w.published).sum()
    }

    /// Every worker exited without error
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Orchestrator {
    workers: Vec<Worker>,
    shutdown: CancellationToken,
    stats: Arc<Stats>,
    options: RunOptions,
}

impl Orchestrator {
    /// Resolve every configured generator kind into workers.
    ///
    /// Kinds are instantiated in name order, so worker ids are stable for a
    /// given configuration. Any failure aborts the whole build; nothing runs.
    pub fn build(
        config: &BeatConfig,
        registry: &GeneratorRegistry,
        options: RunOptions,
    ) -> Result<Self, GeneratorError> {
        if config.generators().is_empty() {
            return Err(GeneratorError::NoGenerators);
        }

        let shutdown = CancellationToken::new();
        let stats = Arc::new(Stats::new());
        let mut workers = Vec::new();
        for (name, settings) in config.generators() {
            let generators = registry.build(name, settings)?;
            tracing::info!(generator = %name, workers = generators.len(), "Configured generator");
            for generator in generators {
                let worker = Worker::new(workers.len(), generator, shutdown.clone(), options.max_events)
                    .with_stats(Arc::clone(&stats));
                workers.push(worker);
            }
        }

        Ok(Self {
            workers,
            shutdown,
            stats,
            options,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Token that stops every worker when cancelled
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Signal all workers to stop. Safe to call any number of times.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    /// Run every worker to completion.
    ///
    /// Each worker gets its own publisher from `sink`; all publishers are
    /// created before any worker starts. Returns once every worker has exited,
    /// after which the sink is shut down.
    pub async fn run(self, sink: &dyn Sink) -> Result<RunReport, PublishError> {
        let start = Instant::now();

        // Workers are not Sync, so no borrow of them may live across an await
        let clients: Vec<String> = self
            .workers
            .iter()
            .map(|w| format!("{}-{}", w.kind(), w.id()))
            .collect();
        let mut publishers: Vec<Box<dyn Publisher>> = Vec::with_capacity(clients.len());
        for client in &clients {
            match sink.create_publisher(client).await {
                Ok(p) => publishers.push(p),
                Err(e) => {
                    for p in &publishers {
                        if let Err(close_err) = p.close().await {
                            tracing::warn!(error = %close_err, "Failed to close publisher");
                        }
                    }
                    return Err(e);
                }
            }
        }

        let snapshot_handle = self.options.stats_interval.map(|every| {
            let stats = Arc::clone(&self.stats);
            tokio::spawn(async move {
                let mut t = interval(every);
                // First tick completes immediately
                t.tick().await;
                loop {
                    t.tick().await;
                    let snap = stats.snapshot().await;
                    tracing::info!(
                        published = snap.published_count,
                        bytes = snap.byte_count,
                        errors = snap.error_count,
                        rate_inst = snap.interval_throughput(),
                        rate_avg = snap.total_throughput(),
                        p99_us = snap.latency_ns_p99 / 1_000,
                        "Publisher stats"
                    );
                }
            })
        });

        let mut ids = Vec::with_capacity(self.workers.len());
        let mut handles = Vec::with_capacity(self.workers.len());
        for (worker, publisher) in self.workers.into_iter().zip(publishers) {
            ids.push(worker.id());
            handles.push(tokio::spawn(worker.run(publisher)));
        }
        tracing::info!(workers = handles.len(), max_events = ?self.options.max_events, "generatorbeat is running");

        let mut report = RunReport::default();
        for (worker_id, joined) in ids.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(stats)) => report.workers.push(stats),
                Ok(Err(e)) => {
                    tracing::error!(worker_id, error = %e, "Worker returned error");
                    report.failures.push(WorkerFailure {
                        worker_id,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!(worker_id, error = %e, "Worker task panicked");
                    report.failures.push(WorkerFailure {
                        worker_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        if let Some(h) = snapshot_handle {
            h.abort();
        }
        if let Err(e) = sink.shutdown().await {
            tracing::warn!(error = %e, "Sink shutdown failed");
        }

        report.elapsed = start.elapsed();
        tracing::info!(
            elapsed_secs = report.elapsed.as_secs_f64(),
            published = report.total_published(),
            failures = report.failures.len(),
            "generatorbeat stopped"
        );
        Ok(report)
    }

    /// Run until `stop` resolves, which fires the shutdown signal
    pub async fn run_until<F>(self, sink: &dyn Sink, stop: F) -> Result<RunReport, PublishError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        let stop_handle = tokio::spawn(async move {
            stop.await;
            token.cancel();
        });

        let result = self.run(sink).await;
        stop_handle.abort();
        result
    }

    /// Run until SIGINT or SIGTERM fires the shutdown signal
    pub async fn run_with_signal_handling(self, sink: &dyn Sink) -> Result<RunReport, PublishError> {
        self.run_until(sink, stop_signal()).await
    }

    /// Run until `timeout` elapses, or earlier on SIGINT or SIGTERM
    pub async fn run_with_timeout(
        self,
        sink: &dyn Sink,
        timeout: Duration,
    ) -> Result<RunReport, PublishError> {
        let stop = async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    tracing::info!("Duration limit reached, stopping generatorbeat");
                }
                _ = stop_signal() => {}
            }
        };
        self.run_until(sink, stop).await
    }
}

/// Resolves once SIGINT or SIGTERM is received
async fn stop_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received, stopping generatorbeat"),
        _ = terminate => tracing::info!("SIGTERM received, stopping generatorbeat"),
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("workers", &self.workers.len())
            .field("options", &self.options)
            .finish()
    }
}
