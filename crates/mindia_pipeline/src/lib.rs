//! Pipeline engine for Mindia.
//!
//! A [`Pipeline`] runs one [`Source`], then zero or more [`Step`]s, then one
//! [`Sink`] over a [`PipelineContext`]. The first failure stops the run, so
//! the sink never sees output from a failed step.
//!
//! # Example
//!
//! ```rust
//! use mindia_core::{ContentType, MediaPath};
//! use mindia_pipeline::{BytesSource, Pipeline, StorageSink};
//! use mindia_storage::MemoryFileStorage;
//! use std::sync::Arc;
//!
//! # async fn example() -> mindia_error::MindiaResult<()> {
//! let cache = Arc::new(MemoryFileStorage::new());
//! let path = MediaPath::new("/a.png")?;
//!
//! let pipeline = Pipeline::new(
//!     BytesSource::new(path.clone(), ContentType::ImagePng, b"bytes".to_vec()),
//!     StorageSink::new(cache.clone()),
//! );
//! let ctx = pipeline.execute().await?;
//! assert_eq!(ctx.path, path);
//! assert_eq!(cache.len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod context;
mod engine;
mod stages;

pub use buffer::Buffer;
pub use context::PipelineContext;
pub use engine::{Pipeline, Sink, Source, Step};
pub use stages::{BytesSource, StorageSink, StorageSource};
