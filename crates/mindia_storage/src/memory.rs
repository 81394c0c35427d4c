//! In-memory byte storage.

use async_trait::async_trait;
use bytes::Bytes;
use mindia_core::{ContentType, FileInfo, MediaPath};
use mindia_error::{MindiaResult, StorageError};
use mindia_interface::{Download, FileStorage};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: ContentType,
    body: Bytes,
}

/// Byte store kept in process memory. Clones share the same contents.
///
/// # Examples
///
/// ```
/// use mindia_storage::MemoryFileStorage;
///
/// let storage = MemoryFileStorage::new();
/// let shared = storage.clone();
/// assert!(shared.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStorage {
    objects: Arc<RwLock<BTreeMap<MediaPath, StoredObject>>>,
}

impl MemoryFileStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Paths of every stored object, in order.
    pub fn paths(&self) -> Vec<MediaPath> {
        self.objects.read().keys().cloned().collect()
    }

    fn info(path: &MediaPath, object: &StoredObject) -> FileInfo {
        FileInfo::new(
            path.clone(),
            object.content_type.clone(),
            object.body.len() as u64,
        )
    }

    fn fetch(&self, path: &MediaPath) -> MindiaResult<StoredObject> {
        self.objects
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path.as_str()).into())
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    #[tracing::instrument(skip(self, body), fields(path = %path, size = body.len()))]
    async fn upload(
        &self,
        path: &MediaPath,
        body: Bytes,
        content_type: &ContentType,
    ) -> MindiaResult<()> {
        self.objects.write().insert(
            path.clone(),
            StoredObject {
                content_type: content_type.clone(),
                body,
            },
        );
        tracing::debug!(path = %path, "Stored object in memory");
        Ok(())
    }

    async fn download(&self, path: &MediaPath) -> MindiaResult<Download> {
        let object = self.fetch(path)?;
        Ok(Download {
            path: path.clone(),
            content_type: object.content_type,
            content_length: object.body.len() as u64,
            body: Box::pin(Cursor::new(object.body)),
        })
    }

    async fn get(&self, path: &MediaPath) -> MindiaResult<FileInfo> {
        let object = self.fetch(path)?;
        Ok(Self::info(path, &object))
    }

    async fn list(&self, prefix: &MediaPath) -> MindiaResult<Vec<FileInfo>> {
        Ok(self
            .objects
            .read()
            .iter()
            .filter(|(path, _)| path.as_str().starts_with(prefix.as_str()))
            .map(|(path, object)| Self::info(path, object))
            .collect())
    }

    async fn move_object(&self, src: &MediaPath, dst: &MediaPath) -> MindiaResult<()> {
        let mut objects = self.objects.write();
        let object = objects
            .remove(src)
            .ok_or_else(|| StorageError::not_found(src.as_str()))?;
        objects.insert(dst.clone(), object);
        Ok(())
    }

    async fn copy_object(&self, src: &MediaPath, dst: &MediaPath) -> MindiaResult<()> {
        let object = self.fetch(src)?;
        self.objects.write().insert(dst.clone(), object);
        Ok(())
    }

    async fn delete(&self, path: &MediaPath) -> MindiaResult<()> {
        self.objects
            .write()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(path.as_str()).into())
    }

    async fn space_usage(&self) -> MindiaResult<u64> {
        Ok(self
            .objects
            .read()
            .values()
            .map(|object| object.body.len() as u64)
            .sum())
    }
}
