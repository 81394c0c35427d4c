//! Tests for the derived-media cache manager.

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use mindia_cache::{CacheManager, derived_path};
use mindia_core::{ContentType, FileInfo, Media, MediaPath, NamedTransformation};
use mindia_error::{MindiaErrorKind, MindiaResult, StorageError, StorageErrorKind, TransformErrorKind};
use mindia_interface::{Download, FileStorage, MediaRepository};
use mindia_storage::{MemoryFileStorage, MemoryMediaRepository, MemoryNamedTransformationStorage};
use mindia_transform::{NamedTransformationResolver, StepRegistry, StorageOverlaySource, Transformer};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const SOURCE: &str = "/pics/5d1f6a2e-3b4c-4d5e-8f9a-0b1c2d3e4f5a.png";

/// Byte store that counts downloads and can be told to fail lookups.
#[derive(Default)]
struct CountingStorage {
    inner: MemoryFileStorage,
    downloads: AtomicUsize,
    unavailable: bool,
}

impl CountingStorage {
    fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn check(&self) -> MindiaResult<()> {
        if self.unavailable {
            return Err(StorageError::new(StorageErrorKind::Unavailable("offline".into())).into());
        }
        Ok(())
    }
}

#[async_trait]
impl FileStorage for CountingStorage {
    async fn upload(&self, path: &MediaPath, body: Bytes, content_type: &ContentType) -> MindiaResult<()> {
        self.check()?;
        self.inner.upload(path, body, content_type).await
    }

    async fn download(&self, path: &MediaPath) -> MindiaResult<Download> {
        self.check()?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.inner.download(path).await
    }

    async fn get(&self, path: &MediaPath) -> MindiaResult<FileInfo> {
        self.check()?;
        self.inner.get(path).await
    }

    async fn list(&self, prefix: &MediaPath) -> MindiaResult<Vec<FileInfo>> {
        self.check()?;
        self.inner.list(prefix).await
    }

    async fn move_object(&self, src: &MediaPath, dst: &MediaPath) -> MindiaResult<()> {
        self.inner.move_object(src, dst).await
    }

    async fn copy_object(&self, src: &MediaPath, dst: &MediaPath) -> MindiaResult<()> {
        self.inner.copy_object(src, dst).await
    }

    async fn delete(&self, path: &MediaPath) -> MindiaResult<()> {
        self.check()?;
        self.inner.delete(path).await
    }

    async fn space_usage(&self) -> MindiaResult<u64> {
        self.inner.space_usage().await
    }
}

struct Fixture {
    files: Arc<CountingStorage>,
    cache: Arc<MemoryFileStorage>,
    media: Arc<MemoryMediaRepository>,
    manager: CacheManager,
}

fn png(width: u32, height: u32) -> Bytes {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255])));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    Bytes::from(out)
}

fn source() -> MediaPath {
    MediaPath::new(SOURCE).unwrap()
}

async fn fixture_with(files: CountingStorage) -> Fixture {
    let files = Arc::new(files);
    let cache = Arc::new(MemoryFileStorage::new());
    let media = Arc::new(MemoryMediaRepository::new());

    files.inner.upload(&source(), png(80, 40), &ContentType::ImagePng).await.unwrap();
    media
        .save(&Media::new(source(), ContentType::ImagePng, 0))
        .await
        .unwrap();

    let named = Arc::new(MemoryNamedTransformationStorage::with_entries([
        NamedTransformation::new("thumb", "c_scale,w_20,h_20"),
    ]));
    let transformer = Arc::new(Transformer::new(
        NamedTransformationResolver::new(named),
        StepRegistry::with_builtins(Arc::new(StorageOverlaySource::new(files.clone()))),
    ));
    let manager = CacheManager::new(files.clone(), cache.clone(), media.clone(), transformer);

    Fixture {
        files,
        cache,
        media,
        manager,
    }
}

async fn fixture() -> Fixture {
    fixture_with(CountingStorage::default()).await
}

#[tokio::test]
async fn miss_builds_then_hit_serves_without_source() {
    let f = fixture().await;

    let first = f.manager.ensure(&source(), "c_scale,w_20").await.unwrap();
    assert!(!first.hit);
    assert_eq!(first.path, derived_path(&source(), "c_scale,w_20"));
    assert_eq!(f.files.downloads(), 1);

    let second = f.manager.ensure(&source(), "c_scale,w_20").await.unwrap();
    assert!(second.hit);
    assert_eq!(second.path, first.path);
    assert_eq!(f.files.downloads(), 1);
    assert_eq!(f.cache.len(), 1);

    let download = f.manager.fetch_or_build(&source(), "c_scale,w_20").await.unwrap();
    assert_eq!(download.path, first.path);
    assert_eq!(f.files.downloads(), 1);
}

#[tokio::test]
async fn miss_refreshes_the_variant_list() {
    let f = fixture().await;

    f.manager.ensure(&source(), "c_scale,w_20").await.unwrap();
    f.manager.ensure(&source(), "c_scale,w_10").await.unwrap();

    let media = f.media.get(&source()).await.unwrap();
    let mut paths: Vec<_> = media.derived_medias.iter().map(|d| d.path.clone()).collect();
    paths.sort();
    let mut expected = vec![
        derived_path(&source(), "c_scale,w_20"),
        derived_path(&source(), "c_scale,w_10"),
    ];
    expected.sort();
    assert_eq!(paths, expected);
}

#[tokio::test]
async fn named_and_expanded_forms_share_a_key() {
    let f = fixture().await;

    let named = f.manager.ensure(&source(), "t_thumb").await.unwrap();
    let expanded = f.manager.ensure(&source(), "c_scale,w_20,h_20").await.unwrap();
    assert_eq!(named.path, expanded.path);
    assert!(expanded.hit);
}

#[tokio::test]
async fn cache_errors_other_than_not_found_propagate() {
    let files = Arc::new(MemoryFileStorage::new());
    let cache = Arc::new(CountingStorage::unavailable());
    let transformer = Arc::new(Transformer::new(
        NamedTransformationResolver::new(Arc::new(MemoryNamedTransformationStorage::new())),
        StepRegistry::with_builtins(Arc::new(StorageOverlaySource::new(files.clone()))),
    ));
    let manager = CacheManager::new(
        files,
        cache,
        Arc::new(MemoryMediaRepository::new()),
        transformer,
    );

    let err = manager.ensure(&source(), "c_scale,w_20").await.unwrap_err();
    assert!(matches!(
        err.kind(),
        MindiaErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::Unavailable(_))
    ));
}

#[tokio::test]
async fn unknown_operation_never_reaches_the_source() {
    let f = fixture().await;

    let err = f.manager.ensure(&source(), "c_bogus,x_1").await.unwrap_err();
    assert!(matches!(
        err.kind(),
        MindiaErrorKind::Transform(e) if e.kind == TransformErrorKind::TransformationNotFound("c_bogus".into())
    ));
    assert_eq!(f.files.downloads(), 0);
    assert!(f.cache.is_empty());
}

#[tokio::test]
async fn missing_original_is_not_found() {
    let f = fixture().await;
    let missing = MediaPath::new("/pics/nothing.png").unwrap();

    let err = f.manager.ensure(&missing, "c_scale,w_20").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(f.cache.is_empty());
}

#[tokio::test]
async fn clear_removes_variants_and_resets_the_record() {
    let f = fixture().await;
    f.manager.ensure(&source(), "c_scale,w_20").await.unwrap();
    f.manager.ensure(&source(), "c_scale,w_10").await.unwrap();

    let report = f.manager.clear(&source()).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.removed.len(), 2);
    assert!(f.cache.is_empty());
    assert!(f.media.get(&source()).await.unwrap().derived_medias.is_empty());
}

#[tokio::test]
async fn clear_all_empties_the_cache_store() {
    let f = fixture().await;
    f.manager.ensure(&source(), "c_scale,w_20").await.unwrap();

    let report = f.manager.clear_all().await.unwrap();
    assert_eq!(report.removed.len(), 1);
    assert!(f.cache.is_empty());
    assert!(f.media.get(&source()).await.unwrap().derived_medias.is_empty());
}

#[tokio::test]
async fn refreshing_without_a_record_is_a_no_op() {
    let f = fixture().await;
    let orphan = MediaPath::new("/pics/orphan.png").unwrap();
    assert!(f.manager.refresh_derived(&orphan).await.unwrap().is_none());
}
