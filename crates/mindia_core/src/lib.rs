//! Core data types for the Mindia media transformation engine.
//!
//! This crate provides the records and value types shared by every other
//! Mindia crate: media paths, content types, media records and their derived
//! variants, transformations, and scheduler tasks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod content_type;
mod geometry;
mod media;
mod path;
mod task;
mod transformation;

pub use content_type::ContentType;
pub use geometry::{Anchor, Position, Size};
pub use media::{DerivedMedia, FileInfo, Media, Metadata, SortKey, Tag, TagBuilder};
pub use path::MediaPath;
pub use task::{Task, TaskPayload, TaskStatus};
pub use transformation::{NAMED_TRANSFORMATION_PREFIX, NamedTransformation, Transformation};
