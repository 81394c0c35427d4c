//! Error types for the Mindia media transformation engine.
//!
//! This crate provides the foundation error types used throughout the Mindia workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use mindia_error::{MindiaResult, StorageError, StorageErrorKind};
//!
//! fn fetch(path: &str) -> MindiaResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::NotFound(path.to_string())))?
//! }
//!
//! let err = fetch("/missing.png").unwrap_err();
//! assert!(err.is_not_found());
//! assert!(err.is_retryable());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod json;
mod media;
mod pipeline;
mod scheduler;
mod storage;
mod transform;

pub use config::ConfigError;
pub use error::{MindiaError, MindiaErrorKind, MindiaResult};
pub use http::HttpError;
pub use json::JsonError;
pub use media::{MediaError, MediaErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use scheduler::{SchedulerError, SchedulerErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use transform::{TransformError, TransformErrorKind};
