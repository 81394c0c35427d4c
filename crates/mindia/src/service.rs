//! Media operations over the configured stores.

use crate::archive;
use bytes::Bytes;
use mindia_cache::{CacheManager, CleanupReport};
use mindia_core::{ContentType, Media, MediaPath, Task};
use mindia_error::{MediaError, MediaErrorKind, MindiaResult};
use mindia_interface::{AnalyticsRecorder, Download, FileStorage, MediaQuery, MediaRepository};
use mindia_pipeline::{Buffer, BytesSource, Pipeline, StorageSink};
use mindia_scheduler::{ColorizePlugin, TaskScheduler};
use mindia_transform::{optimization_steps, split_request_path};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of moving or copying a media object.
#[derive(Debug)]
pub struct TransferOutcome {
    /// Record at the destination
    pub media: Media,
    /// Variants that were carried over, and those that could not be
    pub report: CleanupReport,
}

/// Upload, serve and maintain media objects and their cached variants.
///
/// Every download counts as a media request; bytes served are recorded as
/// bandwidth.
pub struct MediaService {
    files: Arc<dyn FileStorage>,
    media: Arc<dyn MediaRepository>,
    cache: CacheManager,
    scheduler: Arc<TaskScheduler>,
    analytics: Arc<dyn AnalyticsRecorder>,
}

impl MediaService {
    /// Service over `files` and `media`, caching variants through `cache`.
    pub fn new(
        files: Arc<dyn FileStorage>,
        media: Arc<dyn MediaRepository>,
        cache: CacheManager,
        scheduler: Arc<TaskScheduler>,
        analytics: Arc<dyn AnalyticsRecorder>,
    ) -> Self {
        Self {
            files,
            media,
            cache,
            scheduler,
            analytics,
        }
    }

    /// The cache manager serving variants.
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Store a new original and record it.
    ///
    /// JPEG and PNG uploads have their EXIF data extracted and are stored as
    /// WebP, so the returned record may live at a different extension than
    /// `path`. Each of `eager` is cached right away.
    ///
    /// # Errors
    ///
    /// Unsupported content types are rejected before anything is stored.
    #[instrument(skip(self, body, eager), fields(path = %path, content_type = %content_type, size = body.len()))]
    pub async fn upload(
        &self,
        path: MediaPath,
        body: Bytes,
        content_type: ContentType,
        eager: &[String],
    ) -> MindiaResult<Media> {
        if !content_type.is_supported() {
            return Err(MediaError::new(MediaErrorKind::UnsupportedContentType(
                content_type.to_string(),
            ))
            .into());
        }

        let steps = optimization_steps(&content_type)?;
        let mut ctx = Pipeline::new(
            BytesSource::new(path, content_type, body),
            StorageSink::new(self.files.clone()),
        )
        .with_steps(steps)
        .execute()
        .await?;

        let content_length = ctx.bytes().await?.len() as u64;
        let mut media = Media::new(ctx.path, ctx.content_type, content_length);
        media.embedded_metadata = ctx.embedded_metadata;
        media.tags = ctx.tags;
        self.media.save(&media).await?;
        info!(stored = %media.path, content_length, "Uploaded media");

        if eager.is_empty() {
            return Ok(media);
        }
        for transformation in eager {
            self.cache.ensure(&media.path, transformation).await?;
        }
        self.media.get(&media.path).await
    }

    /// Open the original at `path`, or its variant for `transformation`.
    ///
    /// An empty transformation serves the original. A variant is built and
    /// cached on first request.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn download(&self, path: &MediaPath, transformation: &str) -> MindiaResult<Download> {
        self.analytics.record_media_request();

        let download = if transformation.trim().is_empty() {
            self.files.download(path).await?
        } else {
            self.cache.fetch_or_build(path, transformation).await?
        };
        self.analytics.record_bandwidth_usage(download.content_length);
        debug!(served = %download.path, bytes = download.content_length, "Serving media");
        Ok(download)
    }

    /// Bundle the originals at `paths` into one zip archive.
    ///
    /// Each distinct path becomes one entry named by the path without its
    /// leading `/`. Counts as a single media request.
    ///
    /// # Errors
    ///
    /// Fails on the first path that cannot be read; no partial archive is
    /// returned.
    #[instrument(skip(self, paths), fields(count = paths.len()))]
    pub async fn download_many(&self, paths: &[MediaPath]) -> MindiaResult<Bytes> {
        self.analytics.record_media_request();

        let mut entries: Vec<(MediaPath, Bytes)> = Vec::with_capacity(paths.len());
        for path in paths {
            if entries.iter().any(|(seen, _)| seen == path) {
                continue;
            }
            let download = self.files.download(path).await?;
            let body = Buffer::from_stream(download.body).bytes().await?;
            entries.push((path.clone(), body));
        }

        let archive = tokio::task::spawn_blocking(move || archive::zip_entries(&entries))
            .await
            .map_err(|e| MediaError::new(MediaErrorKind::Archive(e.to_string())))??;
        self.analytics.record_bandwidth_usage(archive.len() as u64);
        info!(bytes = archive.len(), "Built media archive");
        Ok(archive)
    }

    /// Open the object named by a request path such as
    /// `/c_scale,w_100/users/a.webp`.
    pub async fn download_request(&self, request_path: &str) -> MindiaResult<Download> {
        let (transformation, path) = split_request_path(request_path)?;
        self.download(&path, &transformation).await
    }

    /// Record at `path`.
    pub async fn get(&self, path: &MediaPath) -> MindiaResult<Media> {
        self.media.get(path).await
    }

    /// A page of records.
    pub async fn list(&self, query: &MediaQuery) -> MindiaResult<Vec<Media>> {
        self.media.list(query).await
    }

    /// Delete the original at `path`, every variant it lists, and its record.
    ///
    /// Byte-store failures do not stop the delete; they are collected in the
    /// returned report.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete(&self, path: &MediaPath) -> MindiaResult<CleanupReport> {
        let media = self.media.get(path).await?;
        let mut report = CleanupReport::new();

        match self.files.delete(&media.path).await {
            Ok(()) => report.removed(media.path.clone()),
            Err(e) => report.failed(&media.path, e),
        }
        for derived in &media.derived_medias {
            match self.cache.cache_store().delete(&derived.path).await {
                Ok(()) => report.removed(derived.path.clone()),
                Err(e) => report.failed(&derived.path, e),
            }
        }

        self.media.delete(&media.path).await?;
        self.analytics.record_media_delete();
        info!(removed = report.removed.len(), failed = report.failures.len(), "Deleted media");
        Ok(report)
    }

    /// Delete each of `paths` in order, stopping at the first error.
    pub async fn delete_many(&self, paths: &[MediaPath]) -> MindiaResult<CleanupReport> {
        let mut report = CleanupReport::new();
        for path in paths {
            report.merge(self.delete(path).await?);
        }
        Ok(report)
    }

    /// Move the original at `src` and its variants into `dst_dir`.
    ///
    /// A variant that cannot be moved is reported and dropped from the record.
    #[instrument(skip(self), fields(src = %src, dst_dir = %dst_dir))]
    pub async fn move_to(&self, src: &MediaPath, dst_dir: &MediaPath) -> MindiaResult<TransferOutcome> {
        let mut media = self.media.get(src).await?;
        let destination = media.path.with_dir(dst_dir);
        if destination == media.path {
            debug!("Source already in destination directory");
            return Ok(TransferOutcome {
                media,
                report: CleanupReport::new(),
            });
        }

        self.files.move_object(&media.path, &destination).await?;
        let previous = std::mem::replace(&mut media.path, destination);

        let mut report = CleanupReport::new();
        let mut moved = Vec::with_capacity(media.derived_medias.len());
        for mut derived in std::mem::take(&mut media.derived_medias) {
            let target = derived.path.with_dir(dst_dir);
            match self.cache.cache_store().move_object(&derived.path, &target).await {
                Ok(()) => {
                    report.removed(derived.path.clone());
                    derived.path = target;
                    moved.push(derived);
                }
                Err(e) => report.failed(&derived.path, e),
            }
        }
        media.derived_medias = moved;
        media.touch();

        self.media.delete(&previous).await?;
        self.media.save(&media).await?;
        info!(moved = %media.path, failed = report.failures.len(), "Moved media");
        Ok(TransferOutcome { media, report })
    }

    /// Copy the original at `src` and its variants into `dst_dir` under a new
    /// record.
    ///
    /// # Errors
    ///
    /// Copying an object onto itself is rejected as an invalid path.
    #[instrument(skip(self), fields(src = %src, dst_dir = %dst_dir))]
    pub async fn copy_to(&self, src: &MediaPath, dst_dir: &MediaPath) -> MindiaResult<TransferOutcome> {
        let source = self.media.get(src).await?;
        let destination = source.path.with_dir(dst_dir);
        if destination == source.path {
            return Err(MediaError::new(MediaErrorKind::InvalidPath(format!(
                "copy destination equals source: '{}'",
                destination
            )))
            .into());
        }

        self.files.copy_object(&source.path, &destination).await?;

        let mut copy = Media::new(destination, source.content_type.clone(), source.content_length);
        copy.embedded_metadata = source.embedded_metadata.clone();
        copy.tags = source.tags.clone();

        let mut report = CleanupReport::new();
        for derived in &source.derived_medias {
            let target = derived.path.with_dir(dst_dir);
            match self.cache.cache_store().copy_object(&derived.path, &target).await {
                Ok(()) => {
                    let mut variant = derived.clone();
                    variant.path = target;
                    copy.derived_medias.push(variant);
                }
                Err(e) => report.failed(&derived.path, e),
            }
        }

        self.media.save(&copy).await?;
        info!(copied = %copy.path, failed = report.failures.len(), "Copied media");
        Ok(TransferOutcome {
            media: copy,
            report,
        })
    }

    /// Delete the cached variants of `path`.
    pub async fn clear_cache(&self, path: &MediaPath) -> MindiaResult<CleanupReport> {
        let report = self.cache.clear(path).await?;
        self.analytics.record_cache_clear();
        Ok(report)
    }

    /// Delete every cached variant.
    pub async fn clear_all_cache(&self) -> MindiaResult<CleanupReport> {
        let report = self.cache.clear_all().await?;
        self.analytics.record_cache_clear();
        Ok(report)
    }

    /// Start colorizing the original at `path`.
    ///
    /// The first plugin step runs immediately so an unusable request fails
    /// here rather than in the background; the task is then queued for
    /// polling. Returns `None` if the plugin finished on the first step.
    ///
    /// # Errors
    ///
    /// Fails with a scheduler `PluginNotFound` error when colorization is not
    /// configured.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn colorize(&self, path: &MediaPath) -> MindiaResult<Option<Task>> {
        let task = ColorizePlugin::task(path.clone())?;
        let Some(task) = self.scheduler.plugins().execute(task).await? else {
            warn!("Colorize finished without queueing");
            return Ok(None);
        };

        self.scheduler.submit(task.clone()).await?;
        self.analytics.record_task_creation();
        info!(task_id = %task.id, "Colorize queued");
        Ok(Some(task))
    }
}

impl std::fmt::Debug for MediaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaService").finish_non_exhaustive()
    }
}
