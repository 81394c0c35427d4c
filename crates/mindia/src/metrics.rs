//! In-process analytics recorder.

use mindia_interface::AnalyticsRecorder;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts usage events in memory.
///
/// Counters only ever grow; storage usage is a gauge holding the latest
/// measurement. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct MediaMetrics {
    inner: Arc<MediaMetricsInner>,
}

#[derive(Debug, Default)]
struct MediaMetricsInner {
    // Counters
    bandwidth_bytes: AtomicU64,
    media_requests: AtomicU64,
    media_deletes: AtomicU64,
    tasks_created: AtomicU64,
    cache_clears: AtomicU64,

    // Gauges
    data_storage_bytes: AtomicU64,
    cache_storage_bytes: AtomicU64,
}

impl MediaMetrics {
    /// Creates a recorder with every value at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets total bytes served.
    pub fn bandwidth_bytes(&self) -> u64 {
        self.inner.bandwidth_bytes.load(Ordering::Relaxed)
    }

    /// Gets the number of download requests.
    pub fn media_requests(&self) -> u64 {
        self.inner.media_requests.load(Ordering::Relaxed)
    }

    /// Gets the number of deletes.
    pub fn media_deletes(&self) -> u64 {
        self.inner.media_deletes.load(Ordering::Relaxed)
    }

    /// Gets the number of tasks created.
    pub fn tasks_created(&self) -> u64 {
        self.inner.tasks_created.load(Ordering::Relaxed)
    }

    /// Gets the number of cache clears.
    pub fn cache_clears(&self) -> u64 {
        self.inner.cache_clears.load(Ordering::Relaxed)
    }

    /// Gets the last measured size of the original store.
    pub fn data_storage_bytes(&self) -> u64 {
        self.inner.data_storage_bytes.load(Ordering::Relaxed)
    }

    /// Gets the last measured size of the cache store.
    pub fn cache_storage_bytes(&self) -> u64 {
        self.inner.cache_storage_bytes.load(Ordering::Relaxed)
    }

    /// Gets a snapshot of all values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bandwidth_bytes: self.bandwidth_bytes(),
            media_requests: self.media_requests(),
            media_deletes: self.media_deletes(),
            tasks_created: self.tasks_created(),
            cache_clears: self.cache_clears(),
            data_storage_bytes: self.data_storage_bytes(),
            cache_storage_bytes: self.cache_storage_bytes(),
        }
    }
}

impl AnalyticsRecorder for MediaMetrics {
    fn record_bandwidth_usage(&self, bytes: u64) {
        self.inner.bandwidth_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_media_request(&self) {
        self.inner.media_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn record_media_delete(&self) {
        self.inner.media_deletes.fetch_add(1, Ordering::Relaxed);
    }

    fn record_data_storage_usage(&self, bytes: u64) {
        self.inner.data_storage_bytes.store(bytes, Ordering::Relaxed);
    }

    fn record_cache_storage_usage(&self, bytes: u64) {
        self.inner.cache_storage_bytes.store(bytes, Ordering::Relaxed);
    }

    fn record_task_creation(&self) {
        self.inner.tasks_created.fetch_add(1, Ordering::Relaxed);
    }

    fn record_cache_clear(&self) {
        self.inner.cache_clears.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`MediaMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Total bytes served
    pub bandwidth_bytes: u64,
    /// Download requests
    pub media_requests: u64,
    /// Deletes
    pub media_deletes: u64,
    /// Tasks created
    pub tasks_created: u64,
    /// Cache clears
    pub cache_clears: u64,
    /// Last measured size of the original store
    pub data_storage_bytes: u64,
    /// Last measured size of the cache store
    pub cache_storage_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_gauges_overwrite() {
        let metrics = MediaMetrics::new();
        let shared = metrics.clone();

        metrics.record_bandwidth_usage(100);
        shared.record_bandwidth_usage(50);
        metrics.record_media_request();
        metrics.record_data_storage_usage(10);
        metrics.record_data_storage_usage(7);

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.bandwidth_bytes, 150);
        assert_eq!(snapshot.media_requests, 1);
        assert_eq!(snapshot.data_storage_bytes, 7);
        assert_eq!(snapshot.cache_clears, 0);
    }
}
