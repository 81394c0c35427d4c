//! Mindia: on-demand media transformation with derived-variant caching.
//!
//! This crate wires the engine crates into a ready-to-use instance:
//!
//! - [`MediaService`]: upload, download (with transformations), list, move,
//!   copy, delete, cache clearing and colorization
//! - [`NamedTransformations`]: stored transformation aliases
//! - [`MindiaConfig`]: layered configuration
//! - [`MediaMetrics`]: in-process usage counters
//! - [`Mindia`]: everything above plus the background workers
//!
//! # Example
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use mindia::{Backends, Mindia, MindiaConfig};
//! use mindia_core::{ContentType, MediaPath};
//!
//! # async fn example(png: Vec<u8>) -> mindia_error::MindiaResult<()> {
//! let config = MindiaConfig::defaults()?;
//! let mindia = Mindia::assemble(Backends::in_memory(), &config, None)?;
//!
//! mindia.named().create("thumb", "c_scale,w_100,h_100").await?;
//! let media = mindia
//!     .media()
//!     .upload(MediaPath::new("/users/a.png")?, Bytes::from(png), ContentType::ImagePng, &[])
//!     .await?;
//! let thumb = mindia.media().download(&media.path, "t_thumb").await?;
//! assert_eq!(thumb.content_type, ContentType::ImageWebp);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod archive;
mod config;
mod metrics;
mod named;
mod observability;
mod service;

pub use app::{Backends, Mindia, REPLICATE_TOKEN_VAR, Workers};
pub use config::{
    CollectorSettings, ColorizeSettings, LoggingSettings, MindiaConfig, SchedulerSettings,
    StorageConfig,
};
pub use metrics::{MediaMetrics, MetricsSnapshot};
pub use named::NamedTransformations;
pub use observability::{ObservabilityConfig, init_observability, init_observability_with_config};
pub use service::{MediaService, TransferOutcome};

pub use mindia_cache::CleanupReport;
pub use mindia_core::{ContentType, Media, MediaPath, Task, TaskStatus};
pub use mindia_error::{MindiaError, MindiaResult};
pub use mindia_interface::{Download, MediaQuery, MediaQueryBuilder};
