//! Task scheduler error types.

/// Specific error conditions for task scheduling and plugins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SchedulerErrorKind {
    /// No plugin registered under the task name
    #[display("Plugin not found: {}", _0)]
    PluginNotFound(String),
    /// Task payload belongs to a different task kind
    #[display("Payload mismatch: expected '{}', found '{}'", expected, found)]
    PayloadMismatch {
        /// Task name the plugin understands
        expected: String,
        /// Task name carried by the task
        found: String,
    },
    /// Task payload is missing or malformed
    #[display("Invalid task payload: {}", _0)]
    InvalidPayload(String),
    /// External prediction service reported a problem
    #[display("Prediction failed: {}", _0)]
    Prediction(String),
    /// The scheduler has already been stopped
    #[display("Scheduler is shut down")]
    Shutdown,
}

/// Scheduler error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scheduler Error: {} at line {} in {}", kind, line, file)]
pub struct SchedulerError {
    /// The specific error condition
    pub kind: SchedulerErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl SchedulerError {
    /// Create a new SchedulerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchedulerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
