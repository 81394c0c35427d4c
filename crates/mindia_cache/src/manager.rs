//! Cache lookups, builds and invalidation.

use crate::CleanupReport;
use mindia_core::{FileInfo, Media, MediaPath};
use mindia_error::MindiaResult;
use mindia_interface::{Download, FileStorage, MediaQuery, MediaRepository};
use mindia_pipeline::{Pipeline, StorageSink, StorageSource};
use mindia_transform::Transformer;
use std::sync::Arc;

/// Cache path of the variant of `source` produced by `resolved`.
///
/// `resolved` must already have its named aliases expanded, so that lookup
/// and build agree on the key.
///
/// # Examples
///
/// ```
/// use mindia_cache::derived_path;
/// use mindia_core::MediaPath;
///
/// let source = MediaPath::new("/users/0b5c8f5e-9f1d-4c9a-8d3e-2a6b7c8d9e0f.webp").unwrap();
/// let variant = derived_path(&source, "c_scale,w_100/c_watermark,o_logo.webp");
/// assert_eq!(
///     variant.as_str(),
///     "/users/0b5c8f5e-9f1d-4c9a-8d3e-2a6b7c8d9e0fc_scale,w_100-c_watermark,o_logo.webp"
/// );
/// ```
pub fn derived_path(source: &MediaPath, resolved: &str) -> MediaPath {
    source.append_suffix(resolved)
}

/// A variant that is present in the cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedVariant {
    /// Cache path of the variant
    pub path: MediaPath,
    /// Whether the variant was already cached
    pub hit: bool,
}

/// Serves and maintains derived variants.
///
/// No lock is taken around builds: two concurrent misses for the same key
/// both build and the last write wins.
#[derive(Clone)]
pub struct CacheManager {
    files: Arc<dyn FileStorage>,
    cache: Arc<dyn FileStorage>,
    media: Arc<dyn MediaRepository>,
    transformer: Arc<Transformer>,
}

impl CacheManager {
    /// Cache building variants of `files` objects into `cache`.
    pub fn new(
        files: Arc<dyn FileStorage>,
        cache: Arc<dyn FileStorage>,
        media: Arc<dyn MediaRepository>,
        transformer: Arc<Transformer>,
    ) -> Self {
        Self {
            files,
            cache,
            media,
            transformer,
        }
    }

    /// The store holding variants.
    pub fn cache_store(&self) -> &Arc<dyn FileStorage> {
        &self.cache
    }

    /// The transformer used for builds.
    pub fn transformer(&self) -> &Arc<Transformer> {
        &self.transformer
    }

    /// Make sure the variant of `path` for `transformation` is cached.
    ///
    /// # Errors
    ///
    /// Transformation errors, a missing original, step failures and any cache
    /// store error other than not-found are returned.
    #[tracing::instrument(skip(self), fields(path = %path))]
    pub async fn ensure(&self, path: &MediaPath, transformation: &str) -> MindiaResult<CachedVariant> {
        let prepared = self.transformer.prepare(transformation).await?;
        let derived = derived_path(path, &prepared.resolved);

        match self.cache.get(&derived).await {
            Ok(_) => {
                tracing::debug!(derived = %derived, "Cache hit");
                return Ok(CachedVariant {
                    path: derived,
                    hit: true,
                });
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(derived = %derived, "Cache miss");
            }
            Err(e) => return Err(e),
        }

        Pipeline::new(
            StorageSource::new(self.files.clone(), path.clone()),
            StorageSink::at(self.cache.clone(), derived.clone()),
        )
        .with_steps(prepared.steps)
        .execute()
        .await?;
        tracing::info!(derived = %derived, "Cached variant");

        self.refresh_derived(path).await?;
        Ok(CachedVariant {
            path: derived,
            hit: false,
        })
    }

    /// Open the variant of `path` for `transformation`, building it first on
    /// a miss.
    pub async fn fetch_or_build(&self, path: &MediaPath, transformation: &str) -> MindiaResult<Download> {
        let variant = self.ensure(path, transformation).await?;
        self.cache.download(&variant.path).await
    }

    /// Rebuild the variant list of the record at `path` from the cache store.
    ///
    /// Returns `None` when no record exists for `path`.
    #[tracing::instrument(skip(self), fields(path = %path))]
    pub async fn refresh_derived(&self, path: &MediaPath) -> MindiaResult<Option<Media>> {
        let mut media = match self.media.get(path).await {
            Ok(media) => media,
            Err(e) if e.is_not_found() => {
                tracing::warn!("No media record to refresh");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let variants = self.variants(path).await?;
        tracing::debug!(variants = variants.len(), "Refreshed variant list");
        media.replace_derived(variants);
        self.media.save(&media).await?;
        Ok(Some(media))
    }

    /// Cached variants of `path`, excluding other objects that share its
    /// prefix.
    async fn variants(&self, path: &MediaPath) -> MindiaResult<Vec<FileInfo>> {
        let mut listed = self.cache.list(&path.variant_prefix()).await?;
        listed.retain(|info| info.path().is_variant_of(path));
        Ok(listed)
    }

    /// Delete every cached variant of `path` and refresh its record.
    #[tracing::instrument(skip(self), fields(path = %path))]
    pub async fn clear(&self, path: &MediaPath) -> MindiaResult<CleanupReport> {
        let mut report = CleanupReport::new();
        for variant in self.variants(path).await? {
            match self.cache.delete(variant.path()).await {
                Ok(()) => report.removed(variant.path().clone()),
                Err(e) => report.failed(variant.path(), e),
            }
        }
        self.refresh_derived(path).await?;
        tracing::info!(removed = report.removed.len(), failed = report.failures.len(), "Cleared variants");
        Ok(report)
    }

    /// Delete every object in the cache store and refresh every record that
    /// listed variants.
    #[tracing::instrument(skip(self))]
    pub async fn clear_all(&self) -> MindiaResult<CleanupReport> {
        let mut report = CleanupReport::new();
        for variant in self.cache.list(&MediaPath::root()).await? {
            match self.cache.delete(variant.path()).await {
                Ok(()) => report.removed(variant.path().clone()),
                Err(e) => report.failed(variant.path(), e),
            }
        }

        let records = self.media.list(&MediaQuery::under(MediaPath::root())).await?;
        for media in records.iter().filter(|m| !m.derived_medias.is_empty()) {
            self.refresh_derived(&media.path).await?;
        }
        tracing::info!(removed = report.removed.len(), failed = report.failures.len(), "Cleared cache");
        Ok(report)
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager").finish_non_exhaustive()
    }
}
