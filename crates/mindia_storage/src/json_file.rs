//! A JSON document persisted to a single file.

use mindia_error::{JsonError, MindiaResult, StorageError, StorageErrorKind};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A value of type `T` stored as pretty-printed JSON in one file.
///
/// Every operation re-reads the file, so several processes may share it.
/// Writes within one process are serialized; writes use temp file + rename.
#[derive(Debug)]
pub struct JsonDocument<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _value: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Document stored at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _value: PhantomData,
        }
    }

    /// File backing the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value, or `T::default()` if the file does not exist yet.
    pub async fn load(&self) -> MindiaResult<T> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
                .into());
            }
        };
        if raw.is_empty() {
            return Ok(T::default());
        }
        serde_json::from_slice(&raw).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
            .into()
        })
    }

    /// Apply `f` to the current value and persist the result.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> MindiaResult<R> {
        let _guard = self.write_lock.lock().await;
        let mut value = self.load().await?;
        let result = f(&mut value);
        self.store(&value).await?;
        Ok(result)
    }

    async fn store(&self, value: &T) -> MindiaResult<()> {
        let raw = serde_json::to_vec_pretty(value).map_err(|e| JsonError::new(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &raw).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %self.path.display(), size = raw.len(), "Wrote JSON document");
        Ok(())
    }
}
