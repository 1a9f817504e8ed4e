use hdrhistogram::Histogram;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Run-wide publishing statistics shared by all workers
pub struct Stats {
    // Publish call latency (nanosecond precision)
    latency_hist: RwLock<Histogram<u64>>,

    pub published_count: RwLock<u64>,
    pub byte_count: RwLock<u64>,
    pub error_count: RwLock<u64>,

    start_time: Instant,
    last_snapshot: RwLock<(Instant, u64)>,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            // 1ns to 60s range, 3 significant digits
            latency_hist: RwLock::new(
                Histogram::new_with_bounds(1, 60_000_000_000, 3).expect("valid histogram bounds"),
            ),
            published_count: RwLock::new(0),
            byte_count: RwLock::new(0),
            error_count: RwLock::new(0),
            start_time: now,
            last_snapshot: RwLock::new((now, 0)),
        }
    }

    /// Record one completed publish of `bytes` message bytes
    pub async fn record_published(&self, bytes: u64, latency: Duration) {
        *self.published_count.write().await += 1;
        *self.byte_count.write().await += bytes;
        if let Ok(mut hist) = self.latency_hist.try_write() {
            let _ = hist.record((latency.as_nanos() as u64).clamp(1, 60_000_000_000));
        }
    }

    pub async fn record_error(&self) {
        *self.error_count.write().await += 1;
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let now = Instant::now();
        let published = *self.published_count.read().await;
        let bytes = *self.byte_count.read().await;
        let errors = *self.error_count.read().await;

        let hist = self.latency_hist.read().await;
        let (interval_duration, interval_published) = {
            let mut last = self.last_snapshot.write().await;
            let since = now.duration_since(last.0);
            let delta = published.saturating_sub(last.1);
            *last = (now, published);
            (since, delta)
        };

        StatsSnapshot {
            published_count: published,
            byte_count: bytes,
            error_count: errors,
            interval_published,
            total_duration: now.duration_since(self.start_time),
            interval_duration,
            latency_ns_p50: hist.value_at_quantile(0.5),
            latency_ns_p99: hist.value_at_quantile(0.99),
            latency_ns_max: hist.max(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub published_count: u64,
    pub byte_count: u64,
    pub error_count: u64,
    pub interval_published: u64,
    pub total_duration: Duration,
    pub interval_duration: Duration,
    pub latency_ns_p50: u64,
    pub latency_ns_p99: u64,
    pub latency_ns_max: u64,
}

impl StatsSnapshot {
    /// Events per second since the previous snapshot
    pub fn interval_throughput(&self) -> f64 {
        let secs = self.interval_duration.as_secs_f64();
        if secs > 0.0 {
            self.interval_published as f64 / secs
        } else {
            0.0
        }
    }

    /// Events per second over the whole run
    pub fn total_throughput(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs > 0.0 {
            self.published_count as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_published_and_errors() {
        let stats = Stats::new();
        stats.record_published(10, Duration::from_micros(5)).await;
        stats.record_published(7, Duration::from_micros(9)).await;
        stats.record_error().await;
        let snap = stats.snapshot().await;
        assert_eq!(snap.published_count, 2);
        assert_eq!(snap.byte_count, 17);
        assert_eq!(snap.error_count, 1);
        assert_eq!(snap.interval_published, 2);
        assert!(snap.latency_ns_max >= 9_000);
    }

    #[tokio::test]
    async fn interval_resets_between_snapshots() {
        let stats = Stats::new();
        stats.record_published(1, Duration::from_nanos(100)).await;
        let _ = stats.snapshot().await;
        stats.record_published(1, Duration::from_nanos(100)).await;
        let snap = stats.snapshot().await;
        assert_eq!(snap.published_count, 2);
        assert_eq!(snap.interval_published, 1);
    }
}
