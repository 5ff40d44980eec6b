//! Internal metrics collection.
//!
//! Counters and latency histograms for calendar rebuilds and report runs,
//! logged as a snapshot when a command finishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for calendar and report runs.
#[derive(Debug, Default)]
pub struct Metrics {
    // Calendar
    pub calendar_rebuilds: Counter,
    pub calendar_rows_written: Counter,
    pub calendar_rebuild_errors: Counter,

    // Reports
    pub reports_built: Counter,
    pub report_rows: Counter,
    pub orders_excluded: Counter,

    // Data source
    pub data_access_errors: Counter,

    // Latency histograms
    pub rebuild_latency_ms: Histogram,
    pub report_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub calendar_rebuilds: u64,
    pub calendar_rows_written: u64,
    pub calendar_rebuild_errors: u64,
    pub reports_built: u64,
    pub report_rows: u64,
    pub orders_excluded: u64,
    pub data_access_errors: u64,
    pub rebuild_latency_mean_ms: f64,
    pub report_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            calendar_rebuilds: self.calendar_rebuilds.get(),
            calendar_rows_written: self.calendar_rows_written.get(),
            calendar_rebuild_errors: self.calendar_rebuild_errors.get(),
            reports_built: self.reports_built.get(),
            report_rows: self.report_rows.get(),
            orders_excluded: self.orders_excluded.get(),
            data_access_errors: self.data_access_errors.get(),
            rebuild_latency_mean_ms: self.rebuild_latency_ms.mean(),
            report_latency_mean_ms: self.report_latency_ms.mean(),
        }
    }
}

/// Logs a metrics snapshot at debug level.
pub fn log_snapshot(snapshot: &MetricsSnapshot) {
    tracing::debug!(
        calendar_rebuilds = snapshot.calendar_rebuilds,
        calendar_rows_written = snapshot.calendar_rows_written,
        calendar_rebuild_errors = snapshot.calendar_rebuild_errors,
        reports_built = snapshot.reports_built,
        report_rows = snapshot.report_rows,
        orders_excluded = snapshot.orders_excluded,
        data_access_errors = snapshot.data_access_errors,
        rebuild_latency_mean_ms = snapshot.rebuild_latency_mean_ms,
        report_latency_mean_ms = snapshot.report_latency_mean_ms,
        "Run metrics"
    );
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
