//! Run metrics collection.

use serde::{Serialize, Serializer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Counters shared by the fetch and process stages of one run.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Resources fetched and decoded successfully
    pub items_fetched: AtomicU64,

    /// Resources that ended in a failure outcome
    pub fetch_failures: AtomicU64,

    /// Failures caused by the per-item timeout
    pub fetch_timeouts: AtomicU64,

    /// Total body bytes received for successful fetches
    pub bytes_read: AtomicU64,

    /// Outcomes that went through simulated work
    pub items_processed: AtomicU64,

    /// Outcomes mapped straight to zero (failures and empty payloads)
    pub items_skipped: AtomicU64,

    /// Start time
    start_time: Option<Instant>,

    // Per-stage timing, summed across tasks (microseconds)
    /// Time spent fetching
    pub fetch_us: AtomicU64,

    /// Time spent in simulated work
    pub process_us: AtomicU64,
}

impl Metrics {
    /// Create new metrics.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        })
    }

    pub fn add_item_fetched(&self) {
        self.items_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_fetch_timeout(&self) {
        self.fetch_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_item_processed(&self) {
        self.items_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_item_skipped(&self) {
        self.items_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record time spent on one fetch (in microseconds).
    pub fn add_fetch_time(&self, duration: Duration) {
        self.fetch_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record time spent processing one payload (in microseconds).
    pub fn add_process_time(&self, duration: Duration) {
        self.process_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start_time.map_or(Duration::ZERO, |t| t.elapsed())
    }

    /// Fetches (successful or not) completed per second of wall time.
    pub fn fetches_per_second(&self) -> f64 {
        let fetches = self.items_fetched.load(Ordering::Relaxed)
            + self.fetch_failures.load(Ordering::Relaxed);
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            fetches as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_fetched: self.items_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            fetch_timeouts: self.fetch_timeouts.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            items_processed: self.items_processed.load(Ordering::Relaxed),
            items_skipped: self.items_skipped.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
            fetches_per_second: self.fetches_per_second(),
            fetch_secs: self.fetch_us.load(Ordering::Relaxed) as f64 / 1_000_000.0,
            process_secs: self.process_us.load(Ordering::Relaxed) as f64 / 1_000_000.0,
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub items_fetched: u64,
    pub fetch_failures: u64,
    pub fetch_timeouts: u64,
    pub bytes_read: u64,
    pub items_processed: u64,
    pub items_skipped: u64,
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
    pub fetches_per_second: f64,
    /// Total time spent fetching (seconds, summed across tasks)
    pub fetch_secs: f64,
    /// Total time spent in simulated work (seconds, summed across tasks)
    pub process_secs: f64,
}

impl MetricsSnapshot {
    /// Save metrics to a JSON file.
    pub fn save_to_file(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!("Metrics saved to {}", path);
        Ok(())
    }

    /// Ratio of summed per-task time to wall time; ~1 for a sequential run.
    pub fn overlap_factor(&self) -> f64 {
        let wall = self.elapsed.as_secs_f64();
        if wall > 0.0 {
            (self.fetch_secs + self.process_secs) / wall
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fetched: {} ok, {} failed ({} timed out) | Read: {} bytes | \
             Processed: {} worked, {} skipped | Time: fetch {:.2}s, process {:.2}s | \
             Elapsed: {:.2}s (overlap x{:.1})",
            self.items_fetched,
            self.fetch_failures,
            self.fetch_timeouts,
            self.bytes_read,
            self.items_processed,
            self.items_skipped,
            self.fetch_secs,
            self.process_secs,
            self.elapsed.as_secs_f64(),
            self.overlap_factor(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = Metrics::new();

        metrics.add_bytes_read(1000);
        metrics.add_bytes_read(500);

        assert_eq!(metrics.bytes_read.load(Ordering::Relaxed), 1500);
    }

    #[test]
    fn test_all_counters() {
        let metrics = Metrics::new();

        metrics.add_item_fetched();
        metrics.add_item_fetched();
        metrics.add_fetch_failure();
        metrics.add_fetch_timeout();
        metrics.add_item_processed();
        metrics.add_item_skipped();
        metrics.add_item_skipped();

        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.items_fetched, 2);
        assert_eq!(snapshot.fetch_failures, 1);
        assert_eq!(snapshot.fetch_timeouts, 1);
        assert_eq!(snapshot.items_processed, 1);
        assert_eq!(snapshot.items_skipped, 2);
    }

    #[test]
    fn test_timing_metrics() {
        let metrics = Metrics::new();

        metrics.add_fetch_time(Duration::from_millis(100));
        metrics.add_fetch_time(Duration::from_millis(50));
        metrics.add_process_time(Duration::from_millis(25));

        let snapshot = metrics.snapshot();

        assert!((snapshot.fetch_secs - 0.15).abs() < 0.001);
        assert!((snapshot.process_secs - 0.025).abs() < 0.001);
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot = MetricsSnapshot {
            items_fetched: 4,
            fetch_failures: 1,
            fetch_timeouts: 0,
            bytes_read: 2048,
            items_processed: 3,
            items_skipped: 2,
            elapsed: Duration::from_secs(2),
            fetches_per_second: 2.5,
            fetch_secs: 1.0,
            process_secs: 3.0,
        };

        let display = format!("{}", snapshot);

        assert!(display.contains("4 ok"));
        assert!(display.contains("1 failed"));
        assert!(display.contains("2048 bytes"));
        assert!(display.contains("overlap x2.0"));
    }

    #[test]
    fn test_zero_elapsed_no_panic() {
        let metrics = Metrics {
            start_time: None,
            ..Default::default()
        };

        metrics.add_item_fetched();

        assert_eq!(metrics.fetches_per_second(), 0.0);
        assert_eq!(metrics.snapshot().overlap_factor(), 0.0);
    }

    #[test]
    fn test_snapshot_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let metrics = Metrics::new();
        metrics.add_item_fetched();

        metrics.snapshot().save_to_file(path.to_str().unwrap()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["items_fetched"], 1);
        assert!(saved["elapsed"].is_f64());
    }
}
