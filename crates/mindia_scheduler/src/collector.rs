//! Periodic storage-usage reporting.

use crate::BackgroundHandle;
use mindia_interface::{AnalyticsRecorder, FileStorage};
use std::sync::Arc;
use std::time::Duration;

/// Reports the size of the original and cache stores at a fixed interval.
pub struct StorageUsageCollector {
    files: Arc<dyn FileStorage>,
    cache: Arc<dyn FileStorage>,
    analytics: Arc<dyn AnalyticsRecorder>,
    interval: Duration,
}

impl StorageUsageCollector {
    /// Collector for `files` and `cache`, reporting to `analytics`.
    pub fn new(
        files: Arc<dyn FileStorage>,
        cache: Arc<dyn FileStorage>,
        analytics: Arc<dyn AnalyticsRecorder>,
        interval: Duration,
    ) -> Self {
        Self {
            files,
            cache,
            analytics,
            interval,
        }
    }

    /// Measure both stores once. A store that cannot be measured is skipped.
    #[tracing::instrument(skip(self))]
    pub async fn collect(&self) {
        match self.files.space_usage().await {
            Ok(bytes) => self.analytics.record_data_storage_usage(bytes),
            Err(e) => tracing::warn!(error = %e, "Failed to measure original store"),
        }
        match self.cache.space_usage().await {
            Ok(bytes) => self.analytics.record_cache_storage_usage(bytes),
            Err(e) => tracing::warn!(error = %e, "Failed to measure cache store"),
        }
    }

    /// Collect now and then every interval until the handle is stopped.
    pub fn start(self: Arc<Self>) -> BackgroundHandle {
        let period = self.interval;
        BackgroundHandle::spawn("storage-usage-collector", period, move || {
            let collector = Arc::clone(&self);
            async move { collector.collect().await }
        })
    }
}

impl std::fmt::Debug for StorageUsageCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageUsageCollector")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
