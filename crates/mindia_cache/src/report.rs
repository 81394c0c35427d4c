//! Outcome of best-effort cleanups.

use mindia_core::MediaPath;
use mindia_error::MediaError;

/// What a cleanup removed and what it could not.
///
/// Failures are `PartialCleanupFailure` errors, one per path.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Objects removed or relocated
    pub removed: Vec<MediaPath>,
    /// Objects that could not be handled
    pub failures: Vec<MediaError>,
}

impl CleanupReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every object was handled.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Note a handled object.
    pub fn removed(&mut self, path: MediaPath) {
        self.removed.push(path);
    }

    /// Note a failure on `path`.
    pub fn failed(&mut self, path: &MediaPath, reason: impl ToString) {
        tracing::warn!(path = %path, reason = %reason.to_string(), "Cleanup incomplete");
        self.failures.push(MediaError::partial_cleanup(path.as_str(), reason));
    }

    /// Fold `other` into this report.
    pub fn merge(&mut self, other: CleanupReport) {
        self.removed.extend(other.removed);
        self.failures.extend(other.failures);
    }
}
