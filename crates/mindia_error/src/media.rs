//! Media operation error types.

/// Specific error conditions for media-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MediaErrorKind {
    /// No media record exists at the path
    #[display("Media not found: {}", _0)]
    NotFound(String),
    /// Uploads of this content type are rejected
    #[display("Mime type not supported: {}", _0)]
    UnsupportedContentType(String),
    /// The path is not absolute or otherwise unusable
    #[display("Invalid media path: {}", _0)]
    InvalidPath(String),
    /// Best-effort cleanup of a secondary object failed; the primary
    /// operation still completed
    #[display("Partial cleanup failure for {}: {}", path, reason)]
    PartialCleanupFailure {
        /// Object that could not be cleaned up
        path: String,
        /// Underlying failure
        reason: String,
    },
    /// Caller is not allowed to perform the operation
    #[display("Unauthorized request: {}", _0)]
    Unauthorized(String),
    /// Several objects could not be bundled into one archive
    #[display("Archive failed: {}", _0)]
    Archive(String),
}

/// Media error with location tracking.
///
/// # Examples
///
/// ```
/// use mindia_error::{MediaError, MediaErrorKind};
///
/// let err = MediaError::new(MediaErrorKind::UnsupportedContentType("text/plain".into()));
/// assert!(format!("{}", err).contains("text/plain"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} at line {} in {}", kind, line, file)]
pub struct MediaError {
    /// The specific error condition
    pub kind: MediaErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl MediaError {
    /// Create a new MediaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MediaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Build a cleanup failure for `path` caused by `reason`.
    #[track_caller]
    pub fn partial_cleanup(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::new(MediaErrorKind::PartialCleanupFailure {
            path: path.into(),
            reason: reason.to_string(),
        })
    }
}
