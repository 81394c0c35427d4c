//! Fire-and-forget analytics sink.

/// Receives usage events. Implementations must not block.
pub trait AnalyticsRecorder: Send + Sync {
    /// Bytes served to a client.
    fn record_bandwidth_usage(&self, bytes: u64);
    /// A media download was requested.
    fn record_media_request(&self);
    /// A media object was deleted.
    fn record_media_delete(&self);
    /// Current size of the original-bytes store.
    fn record_data_storage_usage(&self, bytes: u64);
    /// Current size of the cache store.
    fn record_cache_storage_usage(&self, bytes: u64);
    /// A background task was created.
    fn record_task_creation(&self);
    /// Cached variants were cleared.
    fn record_cache_clear(&self);
}

/// Recorder that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsRecorder for NoopAnalytics {
    fn record_bandwidth_usage(&self, _bytes: u64) {}
    fn record_media_request(&self) {}
    fn record_media_delete(&self) {}
    fn record_data_storage_usage(&self, _bytes: u64) {}
    fn record_cache_storage_usage(&self, _bytes: u64) {}
    fn record_task_creation(&self) {}
    fn record_cache_clear(&self) {}
}
