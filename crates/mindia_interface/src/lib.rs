//! Capability traits for the collaborators Mindia runs against.
//!
//! The engine never talks to a concrete backend directly. Byte stores, the
//! media record store, the named-transformation store, the task queue and the
//! analytics sink are all reached through the traits defined here, so
//! backends can be swapped without touching the pipeline or cache logic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analytics;
mod storage;
mod tasks;
mod types;

pub use analytics::{AnalyticsRecorder, NoopAnalytics};
pub use storage::{FileStorage, MediaRepository, NamedTransformationStorage};
pub use tasks::{TaskQueue, TaskRepository};
pub use types::{ByteStream, Download, MediaQuery, MediaQueryBuilder};
