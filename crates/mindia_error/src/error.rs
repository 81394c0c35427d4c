//! Top-level error wrapper types.

use crate::{
    ConfigError, HttpError, JsonError, MediaError, MediaErrorKind, PipelineError, SchedulerError,
    StorageError, StorageErrorKind, TransformError, TransformErrorKind,
};

/// Every error condition a Mindia crate can report.
///
/// # Examples
///
/// ```
/// use mindia_error::{MindiaError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: MindiaError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum MindiaErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// File or record storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Transformation parsing, resolution or step error
    #[from(TransformError)]
    Transform(TransformError),
    /// Pipeline engine error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Media operation error
    #[from(MediaError)]
    Media(MediaError),
    /// Task scheduling or plugin error
    #[from(SchedulerError)]
    Scheduler(SchedulerError),
}

/// Mindia error with kind discrimination.
///
/// # Examples
///
/// ```
/// use mindia_error::{MindiaResult, ConfigError};
///
/// fn might_fail() -> MindiaResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Mindia Error: {}", _0)]
pub struct MindiaError(Box<MindiaErrorKind>);

impl MindiaError {
    /// Create a new error from a kind.
    pub fn new(kind: MindiaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MindiaErrorKind {
        &self.0
    }

    /// Whether the error reports a missing object, record or named
    /// transformation.
    pub fn is_not_found(&self) -> bool {
        match self.kind() {
            MindiaErrorKind::Storage(e) => e.is_not_found(),
            MindiaErrorKind::Media(e) => matches!(e.kind, MediaErrorKind::NotFound(_)),
            MindiaErrorKind::Transform(e) => {
                matches!(e.kind, TransformErrorKind::NamedTransformationNotFound(_))
            }
            _ => false,
        }
    }

    /// Whether retrying the same operation later could succeed.
    ///
    /// Missing objects count as retryable since they may be created later.
    pub fn is_retryable(&self) -> bool {
        if self.is_not_found() {
            return true;
        }
        match self.kind() {
            MindiaErrorKind::Http(e) => match e.status {
                None => true,
                Some(status) => status == 429 || status >= 500,
            },
            MindiaErrorKind::Storage(e) => matches!(
                e.kind,
                StorageErrorKind::Unavailable(_)
                    | StorageErrorKind::FileRead(_)
                    | StorageErrorKind::FileWrite(_)
            ),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to MindiaErrorKind
impl<T> From<T> for MindiaError
where
    T: Into<MindiaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Mindia operations.
pub type MindiaResult<T> = std::result::Result<T, MindiaError>;
