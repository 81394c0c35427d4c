//! JSON encoding error types.

/// A value could not be encoded to JSON: a task payload, a persisted
/// document, or CLI output.
///
/// # Examples
///
/// ```
/// use mindia_error::JsonError;
///
/// let err = JsonError::new("key must be a string");
/// assert!(err.to_string().starts_with("JSON Error: key must be a string"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// What serde reported
    pub message: String,
    /// Caller line
    pub line: u32,
    /// Caller file
    pub file: &'static str,
}

impl JsonError {
    /// Wrap a serializer message, recording the caller.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
