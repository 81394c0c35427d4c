//! Transformation error types.

/// Specific error conditions for parsing, resolving and running transformations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TransformErrorKind {
    /// No step factory is registered for the operation name
    #[display("Transformation not found: {}", _0)]
    TransformationNotFound(String),
    /// A `t_` reference names a transformation that is not stored
    #[display("Named transformation not found: {}", _0)]
    NamedTransformationNotFound(String),
    /// A named-transformation reference could not be read
    #[display("Malformed transformation reference: {}", _0)]
    MalformedReference(String),
    /// The content type cannot be handled by this step
    #[display("Unsupported content type: {}", _0)]
    UnsupportedContentType(String),
    /// Image bytes could not be decoded
    #[display("Failed to decode image: {}", _0)]
    Decode(String),
    /// Image could not be encoded to the target format
    #[display("Failed to encode image: {}", _0)]
    Encode(String),
    /// An argument was present but not acceptable
    #[display("Invalid argument '{}': {}", name, reason)]
    InvalidArgument {
        /// Argument key
        name: String,
        /// Why the value was rejected
        reason: String,
    },
    /// The watermark overlay could not be obtained
    #[display("Overlay unavailable: {}", _0)]
    Overlay(String),
}

/// Transformation error with location tracking.
///
/// # Examples
///
/// ```
/// use mindia_error::{TransformError, TransformErrorKind};
///
/// let err = TransformError::new(TransformErrorKind::TransformationNotFound("c_bogus".into()));
/// assert!(format!("{}", err).contains("c_bogus"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transform Error: {} at line {} in {}", kind, line, file)]
pub struct TransformError {
    /// The specific error condition
    pub kind: TransformErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TransformError {
    /// Create a new TransformError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
