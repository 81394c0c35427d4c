//! Byte and record storage capabilities.

use crate::{Download, MediaQuery};
use async_trait::async_trait;
use bytes::Bytes;
use mindia_core::{ContentType, FileInfo, Media, MediaPath, NamedTransformation};
use mindia_error::MindiaResult;

/// Byte store for originals or cached variants.
///
/// Single-object writes are expected to be atomic; the engine takes no
/// locks of its own.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `body` at `path`, replacing any existing object.
    async fn upload(
        &self,
        path: &MediaPath,
        body: Bytes,
        content_type: &ContentType,
    ) -> MindiaResult<()>;

    /// Open the object at `path`.
    ///
    /// Fails with a storage `NotFound` error if nothing is stored there.
    async fn download(&self, path: &MediaPath) -> MindiaResult<Download>;

    /// Listing information for a single object.
    async fn get(&self, path: &MediaPath) -> MindiaResult<FileInfo>;

    /// Every object whose path starts with `prefix`.
    async fn list(&self, prefix: &MediaPath) -> MindiaResult<Vec<FileInfo>>;

    /// Move an object, replacing anything at `dst`.
    async fn move_object(&self, src: &MediaPath, dst: &MediaPath) -> MindiaResult<()>;

    /// Copy an object, replacing anything at `dst`.
    async fn copy_object(&self, src: &MediaPath, dst: &MediaPath) -> MindiaResult<()>;

    /// Delete an object.
    async fn delete(&self, path: &MediaPath) -> MindiaResult<()>;

    /// Total bytes held by the store.
    async fn space_usage(&self) -> MindiaResult<u64>;
}

/// Durable store of [`Media`] records.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Record at `path`, or a media `NotFound` error.
    async fn get(&self, path: &MediaPath) -> MindiaResult<Media>;

    /// A sorted page of records under the query prefix.
    async fn list(&self, query: &MediaQuery) -> MindiaResult<Vec<Media>>;

    /// Insert or replace the record keyed by its path.
    async fn save(&self, media: &Media) -> MindiaResult<()>;

    /// Remove the record at `path`.
    async fn delete(&self, path: &MediaPath) -> MindiaResult<()>;
}

/// Store of named transformation aliases.
#[async_trait]
pub trait NamedTransformationStorage: Send + Sync {
    /// Alias called `name`, or `None` when absent.
    async fn get(&self, name: &str) -> MindiaResult<Option<NamedTransformation>>;

    /// Every alias, ordered by name.
    async fn get_all(&self) -> MindiaResult<Vec<NamedTransformation>>;

    /// Insert or replace an alias.
    async fn save(&self, named: &NamedTransformation) -> MindiaResult<()>;

    /// Remove an alias. Removing an unknown alias is not an error.
    async fn delete(&self, name: &str) -> MindiaResult<()>;

    /// Remove every alias.
    async fn delete_all(&self) -> MindiaResult<()>;
}
