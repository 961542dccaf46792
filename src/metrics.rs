//! Workspace Metrics
//!
//! Operation counters and latency tracking for retrofit and filter runs.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Completed,
    Cancelled,
    Failed,
}

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    completed: AtomicU64,
    cancelled: AtomicU64,
    failed: AtomicU64,

    /// Completed operations per name ("retrofit", "filter", ...)
    ops_by_name: RwLock<HashMap<String, u64>>,

    latency_sum_us: AtomicU64,
    latency_count: AtomicU64,
    latency_max_us: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            completed: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            ops_by_name: RwLock::new(HashMap::new()),
            latency_sum_us: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record the end of an operation
    ///
    /// Latency is only tracked for completed operations.
    pub fn record(&self, name: &str, status: OperationStatus, latency: Duration) {
        match status {
            OperationStatus::Cancelled => {
                self.cancelled.fetch_add(1, Ordering::Relaxed);
                return;
            }
            OperationStatus::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
            OperationStatus::Completed => {
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
        }

        *self.ops_by_name.write().entry(name.to_string()).or_insert(0) += 1;

        let latency_us = latency.as_micros() as u64;
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Completed operations by name
    pub fn ops_by_name(&self) -> HashMap<String, u64> {
        self.ops_by_name.read().clone()
    }

    /// Average latency of completed operations in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        self.latency_sum_us.load(Ordering::Relaxed) as f64 / count as f64
    }

    pub fn max_latency_us(&self) -> u64 {
        self.latency_max_us.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> String {
        format!(
            "Operations: {} completed, {} cancelled, {} failed | Latency (µs): avg={:.1}, max={}",
            self.completed(),
            self.cancelled(),
            self.failed(),
            self.avg_latency_us(),
            self.max_latency_us()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.record("retrofit", OperationStatus::Completed, Duration::from_micros(100));
        metrics.record("retrofit", OperationStatus::Completed, Duration::from_micros(300));
        metrics.record("filter", OperationStatus::Completed, Duration::from_micros(200));
        metrics.record("retrofit", OperationStatus::Cancelled, Duration::from_micros(50));
        metrics.record("retrofit", OperationStatus::Failed, Duration::from_micros(50));

        assert_eq!(metrics.completed(), 3);
        assert_eq!(metrics.cancelled(), 1);
        assert_eq!(metrics.failed(), 1);
        assert_eq!(metrics.max_latency_us(), 300);
        assert!((metrics.avg_latency_us() - 200.0).abs() < 0.1);

        let by_name = metrics.ops_by_name();
        assert_eq!(by_name.get("retrofit"), Some(&2));
        assert_eq!(by_name.get("filter"), Some(&1));
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = Metrics::default();
        assert_eq!(metrics.avg_latency_us(), 0.0);
        assert!(metrics.summary().starts_with("Operations: 0 completed"));
    }
}
