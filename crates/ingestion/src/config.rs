//! Backpressure configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Backpressure configuration
///
/// A full channel drops the newest reading; the source thread never blocks.
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Channel capacity
    pub channel_capacity: usize,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

impl BackpressureConfig {
    /// Create new backpressure configuration
    pub fn new(channel_capacity: usize) -> Self {
        Self { channel_capacity }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Readings delivered by sources
    pub readings_received: AtomicU64,

    /// Readings dropped because the channel was full
    pub readings_dropped: AtomicU64,

    /// Current queue length
    pub queue_len: AtomicUsize,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record reading received
    pub fn record_received(&self) {
        self.readings_received.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("stride_ingestion_readings_total").increment(1);
    }

    /// Record reading dropped
    pub fn record_dropped(&self) {
        self.readings_dropped.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("stride_ingestion_readings_dropped_total").increment(1);
    }

    /// Update queue length
    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_received: self.readings_received.load(Ordering::Relaxed),
            readings_dropped: self.readings_dropped.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Readings delivered by sources
    pub readings_received: u64,

    /// Readings dropped because the channel was full
    pub readings_dropped: u64,

    /// Current queue length
    pub queue_len: usize,
}
