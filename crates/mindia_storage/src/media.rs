//! Media record repositories.

use crate::JsonDocument;
use async_trait::async_trait;
use mindia_core::{Media, MediaPath, SortKey};
use mindia_error::{MediaError, MediaErrorKind, MindiaResult};
use mindia_interface::{MediaQuery, MediaRepository};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

type MediaMap = BTreeMap<MediaPath, Media>;

fn not_found(path: &MediaPath) -> MediaError {
    MediaError::new(MediaErrorKind::NotFound(path.to_string()))
}

/// Apply prefix filtering, ordering and pagination to `records`.
fn paginate<'a>(records: impl Iterator<Item = &'a Media>, query: &MediaQuery) -> Vec<Media> {
    let prefix = query.prefix().as_str();
    let mut matching: Vec<&Media> = records
        .filter(|media| media.path.as_str().starts_with(prefix))
        .collect();

    matching.sort_by(|a, b| {
        let ordering = match query.sort() {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::ContentLength => a.content_length.cmp(&b.content_length),
        }
        .then_with(|| a.path.cmp(&b.path));
        if *query.ascending() {
            ordering
        } else {
            ordering.reverse()
        }
    });

    matching
        .into_iter()
        .skip(*query.offset())
        .take(*query.limit())
        .cloned()
        .collect()
}

/// Media records kept in memory. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryMediaRepository {
    records: Arc<RwLock<MediaMap>>,
}

impl MemoryMediaRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl MediaRepository for MemoryMediaRepository {
    async fn get(&self, path: &MediaPath) -> MindiaResult<Media> {
        self.records
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path).into())
    }

    async fn list(&self, query: &MediaQuery) -> MindiaResult<Vec<Media>> {
        Ok(paginate(self.records.read().values(), query))
    }

    async fn save(&self, media: &Media) -> MindiaResult<()> {
        self.records
            .write()
            .insert(media.path.clone(), media.clone());
        Ok(())
    }

    async fn delete(&self, path: &MediaPath) -> MindiaResult<()> {
        self.records
            .write()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path).into())
    }
}

/// Media records persisted as one JSON map keyed by path.
#[derive(Debug)]
pub struct JsonMediaRepository {
    document: JsonDocument<MediaMap>,
}

impl JsonMediaRepository {
    /// Repository backed by the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
        }
    }
}

#[async_trait]
impl MediaRepository for JsonMediaRepository {
    async fn get(&self, path: &MediaPath) -> MindiaResult<Media> {
        self.document
            .load()
            .await?
            .remove(path)
            .ok_or_else(|| not_found(path).into())
    }

    async fn list(&self, query: &MediaQuery) -> MindiaResult<Vec<Media>> {
        let records = self.document.load().await?;
        Ok(paginate(records.values(), query))
    }

    #[tracing::instrument(skip(self, media), fields(path = %media.path))]
    async fn save(&self, media: &Media) -> MindiaResult<()> {
        self.document
            .update(|map| {
                map.insert(media.path.clone(), media.clone());
            })
            .await
    }

    #[tracing::instrument(skip(self), fields(path = %path))]
    async fn delete(&self, path: &MediaPath) -> MindiaResult<()> {
        let removed = self.document.update(|map| map.remove(path)).await?;
        removed.map(|_| ()).ok_or_else(|| not_found(path).into())
    }
}
