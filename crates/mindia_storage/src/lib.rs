//! Storage backends for Mindia.
//!
//! This crate provides reference implementations of every storage capability
//! in `mindia_interface`:
//!
//! - [`FileSystemStorage`]: byte store rooted at a local directory
//! - [`MemoryFileStorage`]: byte store held in memory
//! - [`MemoryMediaRepository`] / [`JsonMediaRepository`]: media records
//! - [`MemoryNamedTransformationStorage`] / [`JsonNamedTransformationStorage`]:
//!   named transformation aliases
//! - [`MemoryTaskStore`] / [`JsonTaskStore`]: task queue plus task records
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use mindia_core::{ContentType, MediaPath};
//! use mindia_interface::FileStorage;
//! use mindia_storage::FileSystemStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/mindia")?;
//! let path = MediaPath::new("/users/picture.png")?;
//!
//! storage
//!     .upload(&path, Bytes::from_static(b"bytes"), &ContentType::ImagePng)
//!     .await?;
//! let info = storage.get(&path).await?;
//! assert_eq!(*info.content_length(), 5);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod json_file;
mod media;
mod memory;
mod named;
mod sniff;
mod tasks;

pub use filesystem::FileSystemStorage;
pub use json_file::JsonDocument;
pub use media::{JsonMediaRepository, MemoryMediaRepository};
pub use memory::MemoryFileStorage;
pub use named::{JsonNamedTransformationStorage, MemoryNamedTransformationStorage};
pub use tasks::{JsonTaskStore, MemoryTaskStore};
