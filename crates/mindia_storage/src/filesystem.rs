//! Filesystem-based byte storage.
//!
//! Objects are stored at their media path below a root directory, so
//! `/users/picture.png` lives at `{root}/users/picture.png`.

use crate::sniff::sniff;
use async_trait::async_trait;
use bytes::Bytes;
use mindia_core::{ContentType, FileInfo, MediaPath};
use mindia_error::{MindiaResult, StorageError, StorageErrorKind};
use mindia_interface::{Download, FileStorage};
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncReadExt;
use uuid::Uuid;

const SNIFF_LEN: usize = 32;
const TEMP_SUFFIX: &str = ".tmp";

/// Filesystem storage backend.
///
/// # Features
///
/// - **Path-mapped**: the media path is the relative file path
/// - **Atomic writes**: uses temp file + rename
/// - **Content sniffing**: content type comes from the stored bytes,
///   falling back to the file extension
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> MindiaResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map a media path to a file below the root, refusing `..` escapes.
    fn resolve(&self, path: &MediaPath) -> MindiaResult<PathBuf> {
        let relative = Path::new(path.as_str().trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(path.to_string())).into());
        }
        Ok(self.base_path.join(relative))
    }

    /// Map a file below the root back to its media path.
    fn to_media_path(&self, file: &Path) -> Option<MediaPath> {
        let relative = file.strip_prefix(&self.base_path).ok()?;
        let mut logical = String::new();
        for component in relative.components() {
            logical.push('/');
            logical.push_str(component.as_os_str().to_str()?);
        }
        MediaPath::new(logical).ok()
    }

    async fn file_info(&self, path: &MediaPath, file: &Path) -> MindiaResult<FileInfo> {
        let metadata = tokio::fs::metadata(file)
            .await
            .map_err(|e| read_error(path, file, e))?;
        if !metadata.is_file() {
            return Err(StorageError::not_found(path.as_str()).into());
        }

        let mut head = [0u8; SNIFF_LEN];
        let mut handle = tokio::fs::File::open(file)
            .await
            .map_err(|e| read_error(path, file, e))?;
        let read = handle
            .read(&mut head)
            .await
            .map_err(|e| read_error(path, file, e))?;

        Ok(FileInfo::new(
            path.clone(),
            sniff(path, &head[..read]),
            metadata.len(),
        ))
    }

    /// Every regular file below `dir`, skipping in-progress writes.
    async fn walk(&self, dir: &Path) -> MindiaResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        current.display(),
                        e
                    )))
                    .into());
                }
            };

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    current.display(),
                    e
                )))
            })? {
                let file_type = entry.file_type().await.map_err(|e| {
                    StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        entry.path().display(),
                        e
                    )))
                })?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() && !is_temp_file(&entry.path()) {
                    files.push(entry.path());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    async fn ensure_parent(&self, file: &Path) -> MindiaResult<()> {
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
        Ok(())
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') && name.ends_with(TEMP_SUFFIX))
}

fn read_error(path: &MediaPath, file: &Path, e: std::io::Error) -> StorageError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::not_found(path.as_str()),
        std::io::ErrorKind::PermissionDenied => {
            StorageError::new(StorageErrorKind::PermissionDenied(file.display().to_string()))
        }
        _ => StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            file.display(),
            e
        ))),
    }
}

fn write_error(path: &MediaPath, file: &Path, e: std::io::Error) -> StorageError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::not_found(path.as_str()),
        std::io::ErrorKind::PermissionDenied => {
            StorageError::new(StorageErrorKind::PermissionDenied(file.display().to_string()))
        }
        _ => StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            file.display(),
            e
        ))),
    }
}

#[async_trait]
impl FileStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, body), fields(path = %path, size = body.len()))]
    async fn upload(
        &self,
        path: &MediaPath,
        body: Bytes,
        content_type: &ContentType,
    ) -> MindiaResult<()> {
        let file = self.resolve(path)?;
        self.ensure_parent(&file).await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = file.with_file_name(format!(".{}{}", Uuid::new_v4(), TEMP_SUFFIX));
        tokio::fs::write(&temp_path, &body)
            .await
            .map_err(|e| write_error(path, &temp_path, e))?;

        if let Err(e) = tokio::fs::rename(&temp_path, &file).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                file.display(),
                e
            )))
            .into());
        }

        tracing::info!(
            path = %path,
            size = body.len(),
            content_type = %content_type,
            "Stored file"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(path = %path))]
    async fn download(&self, path: &MediaPath) -> MindiaResult<Download> {
        let file = self.resolve(path)?;
        let info = self.file_info(path, &file).await?;
        let handle = tokio::fs::File::open(&file)
            .await
            .map_err(|e| read_error(path, &file, e))?;

        tracing::debug!(path = %path, size = info.content_length(), "Opened file");
        Ok(Download {
            path: path.clone(),
            content_type: info.content_type().clone(),
            content_length: *info.content_length(),
            body: Box::pin(handle),
        })
    }

    async fn get(&self, path: &MediaPath) -> MindiaResult<FileInfo> {
        let file = self.resolve(path)?;
        self.file_info(path, &file).await
    }

    #[tracing::instrument(skip(self), fields(prefix = %prefix))]
    async fn list(&self, prefix: &MediaPath) -> MindiaResult<Vec<FileInfo>> {
        // Walk the deepest directory that the prefix names completely
        let prefix_str = prefix.as_str();
        let dir_part = &prefix_str[..prefix_str.rfind('/').map_or(0, |idx| idx + 1)];
        let root = self.resolve(&MediaPath::new(dir_part)?)?;

        let mut infos = Vec::new();
        for file in self.walk(&root).await? {
            let Some(media_path) = self.to_media_path(&file) else {
                tracing::warn!(file = %file.display(), "Skipping file with non UTF-8 name");
                continue;
            };
            if media_path.as_str().starts_with(prefix_str) {
                infos.push(self.file_info(&media_path, &file).await?);
            }
        }

        tracing::debug!(prefix = %prefix, count = infos.len(), "Listed files");
        Ok(infos)
    }

    #[tracing::instrument(skip(self), fields(src = %src, dst = %dst))]
    async fn move_object(&self, src: &MediaPath, dst: &MediaPath) -> MindiaResult<()> {
        let from = self.resolve(src)?;
        let to = self.resolve(dst)?;
        self.ensure_parent(&to).await?;

        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| write_error(src, &from, e))?;

        tracing::info!(src = %src, dst = %dst, "Moved file");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(src = %src, dst = %dst))]
    async fn copy_object(&self, src: &MediaPath, dst: &MediaPath) -> MindiaResult<()> {
        let from = self.resolve(src)?;
        let to = self.resolve(dst)?;
        self.ensure_parent(&to).await?;

        tokio::fs::copy(&from, &to)
            .await
            .map_err(|e| write_error(src, &from, e))?;

        tracing::info!(src = %src, dst = %dst, "Copied file");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(path = %path))]
    async fn delete(&self, path: &MediaPath) -> MindiaResult<()> {
        let file = self.resolve(path)?;

        tokio::fs::remove_file(&file)
            .await
            .map_err(|e| write_error(path, &file, e))?;

        tracing::info!(path = %path, "Deleted file");
        Ok(())
    }

    async fn space_usage(&self) -> MindiaResult<u64> {
        let mut total = 0;
        for file in self.walk(&self.base_path).await? {
            let metadata = tokio::fs::metadata(&file).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    file.display(),
                    e
                )))
            })?;
            total += metadata.len();
        }
        Ok(total)
    }
}
