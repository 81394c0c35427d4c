//! Named transformation stores.

use crate::JsonDocument;
use async_trait::async_trait;
use mindia_core::NamedTransformation;
use mindia_error::MindiaResult;
use mindia_interface::NamedTransformationStorage;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

type NamedMap = BTreeMap<String, NamedTransformation>;

/// Named transformations kept in memory. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryNamedTransformationStorage {
    entries: Arc<RwLock<NamedMap>>,
}

impl MemoryNamedTransformationStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = NamedTransformation>) -> Self {
        let map = entries
            .into_iter()
            .map(|named| (named.name().clone(), named))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl NamedTransformationStorage for MemoryNamedTransformationStorage {
    async fn get(&self, name: &str) -> MindiaResult<Option<NamedTransformation>> {
        Ok(self.entries.read().get(name).cloned())
    }

    async fn get_all(&self) -> MindiaResult<Vec<NamedTransformation>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    async fn save(&self, named: &NamedTransformation) -> MindiaResult<()> {
        self.entries
            .write()
            .insert(named.name().clone(), named.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> MindiaResult<()> {
        self.entries.write().remove(name);
        Ok(())
    }

    async fn delete_all(&self) -> MindiaResult<()> {
        self.entries.write().clear();
        Ok(())
    }
}

/// Named transformations persisted as a JSON map keyed by name.
#[derive(Debug)]
pub struct JsonNamedTransformationStorage {
    document: JsonDocument<NamedMap>,
}

impl JsonNamedTransformationStorage {
    /// Store backed by the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
        }
    }
}

#[async_trait]
impl NamedTransformationStorage for JsonNamedTransformationStorage {
    async fn get(&self, name: &str) -> MindiaResult<Option<NamedTransformation>> {
        Ok(self.document.load().await?.remove(name))
    }

    async fn get_all(&self) -> MindiaResult<Vec<NamedTransformation>> {
        Ok(self.document.load().await?.into_values().collect())
    }

    #[tracing::instrument(skip(self, named), fields(name = %named.name()))]
    async fn save(&self, named: &NamedTransformation) -> MindiaResult<()> {
        self.document
            .update(|map| {
                map.insert(named.name().clone(), named.clone());
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, name: &str) -> MindiaResult<()> {
        self.document
            .update(|map| {
                map.remove(name);
            })
            .await
    }

    async fn delete_all(&self) -> MindiaResult<()> {
        self.document.update(|map| map.clear()).await
    }
}
