//! End-to-end tests of the media operations over in-memory stores.

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mindia::{Backends, ContentType, MediaPath, MediaQuery, Mindia, MindiaConfig};
use mindia_error::{
    MediaErrorKind, MindiaError, MindiaErrorKind, MindiaResult, SchedulerErrorKind,
    TransformErrorKind,
};
use mindia_interface::FileStorage;
use mindia_scheduler::{Prediction, PredictionClient, PredictionStatus};
use mindia_storage::{
    MemoryFileStorage, MemoryMediaRepository, MemoryNamedTransformationStorage, MemoryTaskStore,
};
use std::io::{Cursor, Read};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

struct Harness {
    mindia: Mindia,
    files: MemoryFileStorage,
    cache: MemoryFileStorage,
    tasks: MemoryTaskStore,
}

fn harness_with(client: Option<Arc<dyn PredictionClient>>) -> Harness {
    let files = MemoryFileStorage::new();
    let cache = MemoryFileStorage::new();
    let tasks = MemoryTaskStore::new();
    let backends = Backends {
        files: Arc::new(files.clone()),
        cache: Arc::new(cache.clone()),
        media: Arc::new(MemoryMediaRepository::new()),
        named: Arc::new(MemoryNamedTransformationStorage::new()),
        queue: Arc::new(tasks.clone()),
        tasks: Arc::new(tasks.clone()),
    };
    let config = MindiaConfig::defaults().unwrap();
    Harness {
        mindia: Mindia::assemble(backends, &config, client).unwrap(),
        files,
        cache,
        tasks,
    }
}

fn harness() -> Harness {
    harness_with(None)
}

fn png(width: u32, height: u32) -> Bytes {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    Bytes::from(buf)
}

fn path(p: &str) -> MediaPath {
    MediaPath::new(p).unwrap()
}

fn media_kind(err: &MindiaError) -> Option<&MediaErrorKind> {
    match err.kind() {
        MindiaErrorKind::Media(e) => Some(&e.kind),
        _ => None,
    }
}

fn transform_kind(err: &MindiaError) -> Option<&TransformErrorKind> {
    match err.kind() {
        MindiaErrorKind::Transform(e) => Some(&e.kind),
        _ => None,
    }
}

async fn read_all(download: mindia::Download) -> Vec<u8> {
    let mut body = download.body;
    let mut bytes = Vec::new();
    body.read_to_end(&mut bytes).await.unwrap();
    bytes
}

#[tokio::test]
async fn upload_normalizes_png_to_webp() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(path("/users/a.png"), png(40, 20), ContentType::ImagePng, &[])
        .await
        .unwrap();

    assert_eq!(media.path, path("/users/a.webp"));
    assert_eq!(media.content_type, ContentType::ImageWebp);
    assert!(media.derived_medias.is_empty());
    assert_eq!(h.files.paths(), vec![path("/users/a.webp")]);

    let stored = h.files.get(&media.path).await.unwrap();
    assert_eq!(*stored.content_length(), media.content_length);
    assert_eq!(h.mindia.media().get(&media.path).await.unwrap(), media);
}

#[tokio::test]
async fn upload_rejects_unsupported_types() {
    let h = harness();
    let err = h
        .mindia
        .media()
        .upload(
            path("/notes.txt"),
            Bytes::from_static(b"hello"),
            ContentType::from("text/plain"),
            &[],
        )
        .await
        .unwrap_err();

    assert!(matches!(
        media_kind(&err),
        Some(MediaErrorKind::UnsupportedContentType(ct)) if ct == "text/plain"
    ));
    assert!(h.files.is_empty());
}

#[tokio::test]
async fn eager_transformations_are_cached_on_upload() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(
            path("/users/a.png"),
            png(40, 20),
            ContentType::ImagePng,
            &["c_scale,w_10,h_10".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(media.derived_medias.len(), 1);
    assert_eq!(
        media.derived_medias[0].path,
        path("/users/ac_scale,w_10,h_10.webp")
    );
    assert_eq!(h.cache.len(), 1);
}

#[tokio::test]
async fn download_serves_original_and_records_usage() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(path("/a.png"), png(8, 8), ContentType::ImagePng, &[])
        .await
        .unwrap();

    let download = h.mindia.media().download(&media.path, "").await.unwrap();
    assert_eq!(download.content_type, ContentType::ImageWebp);
    let bytes = read_all(download).await;
    assert_eq!(bytes.len() as u64, media.content_length);

    let snapshot = h.mindia.metrics().snapshot();
    assert_eq!(snapshot.media_requests, 1);
    assert_eq!(snapshot.bandwidth_bytes, media.content_length);
    assert!(h.cache.is_empty());
}

#[tokio::test]
async fn named_and_expanded_requests_share_one_variant() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(path("/users/a.png"), png(40, 20), ContentType::ImagePng, &[])
        .await
        .unwrap();
    h.mindia
        .named()
        .create("thumb", "c_scale,w_10,h_10")
        .await
        .unwrap();

    let first = h.mindia.media().download(&media.path, "t_thumb").await.unwrap();
    let decoded = image::load_from_memory(&read_all(first).await).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (10, 5));

    h.mindia
        .media()
        .download(&media.path, "c_scale,w_10,h_10")
        .await
        .unwrap();

    assert_eq!(h.cache.len(), 1);
    let record = h.mindia.media().get(&media.path).await.unwrap();
    assert_eq!(record.derived_medias.len(), 1);
    assert_eq!(h.mindia.metrics().media_requests(), 2);
}

#[tokio::test]
async fn request_paths_carry_their_transformation() {
    let h = harness();
    h.mindia
        .media()
        .upload(path("/users/a.png"), png(40, 20), ContentType::ImagePng, &[])
        .await
        .unwrap();

    let download = h
        .mindia
        .media()
        .download_request("/c_scale,w_20/users/a.webp")
        .await
        .unwrap();
    assert_eq!(download.path, path("/users/ac_scale,w_20.webp"));

    let original = h
        .mindia
        .media()
        .download_request("/users/a.webp")
        .await
        .unwrap();
    assert_eq!(original.path, path("/users/a.webp"));
}

#[tokio::test]
async fn download_of_missing_media_is_not_found() {
    let h = harness();
    let err = h
        .mindia
        .media()
        .download(&path("/missing.webp"), "c_scale,w_10")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.mindia.metrics().media_requests(), 1);
    assert_eq!(h.mindia.metrics().bandwidth_bytes(), 0);
}

#[tokio::test]
async fn delete_removes_original_variants_and_record() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(
            path("/users/a.png"),
            png(40, 20),
            ContentType::ImagePng,
            &["c_scale,w_10".to_string(), "c_scale,w_20".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(h.cache.len(), 2);

    let report = h.mindia.media().delete(&media.path).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.removed.len(), 3);
    assert!(h.files.is_empty());
    assert!(h.cache.is_empty());
    assert!(h.mindia.media().get(&media.path).await.unwrap_err().is_not_found());
    assert_eq!(h.mindia.metrics().media_deletes(), 1);
}

#[tokio::test]
async fn delete_reports_missing_bytes_without_failing() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(path("/a.png"), png(8, 8), ContentType::ImagePng, &[])
        .await
        .unwrap();
    h.files.delete(&media.path).await.unwrap();

    let report = h.mindia.media().delete(&media.path).await.unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].kind,
        MediaErrorKind::PartialCleanupFailure { .. }
    ));
    assert!(h.mindia.media().get(&media.path).await.is_err());
}

#[tokio::test]
async fn move_relocates_original_and_variants() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(
            path("/inbox/a.png"),
            png(40, 20),
            ContentType::ImagePng,
            &["c_scale,w_10".to_string()],
        )
        .await
        .unwrap();

    let outcome = h
        .mindia
        .media()
        .move_to(&media.path, &path("/archive"))
        .await
        .unwrap();

    assert!(outcome.report.is_clean());
    assert_eq!(outcome.media.path, path("/archive/a.webp"));
    assert_eq!(
        outcome.media.derived_medias[0].path,
        path("/archive/ac_scale,w_10.webp")
    );
    assert_eq!(h.files.paths(), vec![path("/archive/a.webp")]);
    assert_eq!(h.cache.paths(), vec![path("/archive/ac_scale,w_10.webp")]);
    assert!(h.mindia.media().get(&media.path).await.unwrap_err().is_not_found());
    assert_eq!(h.mindia.media().get(&outcome.media.path).await.unwrap().path, outcome.media.path);
}

#[tokio::test]
async fn copy_keeps_source_and_records_the_copy() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(
            path("/inbox/a.png"),
            png(40, 20),
            ContentType::ImagePng,
            &["c_scale,w_10".to_string()],
        )
        .await
        .unwrap();

    let outcome = h
        .mindia
        .media()
        .copy_to(&media.path, &path("/shared"))
        .await
        .unwrap();

    assert_eq!(outcome.media.path, path("/shared/a.webp"));
    assert_eq!(outcome.media.derived_medias.len(), 1);
    assert_eq!(h.files.len(), 2);
    assert_eq!(h.cache.len(), 2);

    let all = h
        .mindia
        .media()
        .list(&MediaQuery::under(MediaPath::root()))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let err = h
        .mindia
        .media()
        .copy_to(&media.path, &path("/inbox"))
        .await
        .unwrap_err();
    assert!(matches!(media_kind(&err), Some(MediaErrorKind::InvalidPath(_))));
}

#[tokio::test]
async fn clearing_the_cache_resets_variant_lists() {
    let h = harness();
    let a = h
        .mindia
        .media()
        .upload(path("/a.png"), png(20, 20), ContentType::ImagePng, &["c_scale,w_10".to_string()])
        .await
        .unwrap();
    let b = h
        .mindia
        .media()
        .upload(path("/b.png"), png(20, 20), ContentType::ImagePng, &["c_scale,w_10".to_string()])
        .await
        .unwrap();

    let report = h.mindia.media().clear_cache(&a.path).await.unwrap();
    assert_eq!(report.removed.len(), 1);
    assert!(h.mindia.media().get(&a.path).await.unwrap().derived_medias.is_empty());
    assert_eq!(h.mindia.media().get(&b.path).await.unwrap().derived_medias.len(), 1);

    h.mindia.media().clear_all_cache().await.unwrap();
    assert!(h.cache.is_empty());
    assert!(h.mindia.media().get(&b.path).await.unwrap().derived_medias.is_empty());
    assert_eq!(h.mindia.metrics().cache_clears(), 2);
}

#[tokio::test]
async fn several_originals_download_as_one_archive() {
    let h = harness();
    let a = h
        .mindia
        .media()
        .upload(path("/users/a.png"), png(20, 10), ContentType::ImagePng, &[])
        .await
        .unwrap();
    let clip = Bytes::from_static(b"not really a movie");
    let b = h
        .mindia
        .media()
        .upload(path("/clips/b.mp4"), clip.clone(), ContentType::VideoMp4, &[])
        .await
        .unwrap();

    let archive = h
        .mindia
        .media()
        .download_many(&[a.path.clone(), b.path.clone(), a.path.clone()])
        .await
        .unwrap();

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.to_vec())).unwrap();
    assert_eq!(zip.len(), 2);
    let mut body = Vec::new();
    zip.by_name("clips/b.mp4").unwrap().read_to_end(&mut body).unwrap();
    assert_eq!(body, clip.to_vec());

    let original = read_all(h.mindia.media().download(&a.path, "").await.unwrap()).await;
    let mut body = Vec::new();
    zip.by_name("users/a.webp").unwrap().read_to_end(&mut body).unwrap();
    assert_eq!(body, original);

    assert_eq!(h.mindia.metrics().media_requests(), 2);
    assert!(h.mindia.metrics().bandwidth_bytes() >= archive.len() as u64);
}

#[tokio::test]
async fn archive_of_a_missing_original_fails() {
    let h = harness();
    let a = h
        .mindia
        .media()
        .upload(path("/users/a.png"), png(20, 10), ContentType::ImagePng, &[])
        .await
        .unwrap();

    let err = h
        .mindia
        .media()
        .download_many(&[a.path, path("/users/ghost.webp")])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn clearing_one_image_keeps_a_prefixed_neighbour() {
    let h = harness();
    let eager = ["c_scale,w_10".to_string()];
    let a = h
        .mindia
        .media()
        .upload(path("/pics/a.png"), png(20, 20), ContentType::ImagePng, &eager)
        .await
        .unwrap();
    let ab = h
        .mindia
        .media()
        .upload(path("/pics/ab.png"), png(20, 20), ContentType::ImagePng, &eager)
        .await
        .unwrap();

    h.mindia.media().download(&a.path, "c_scale,w_5").await.unwrap();
    let a_record = h.mindia.media().get(&a.path).await.unwrap();
    let mut listed: Vec<_> = a_record.derived_medias.iter().map(|d| d.path.clone()).collect();
    listed.sort();
    assert_eq!(
        listed,
        vec![path("/pics/ac_scale,w_10.webp"), path("/pics/ac_scale,w_5.webp")]
    );

    let report = h.mindia.media().clear_cache(&a.path).await.unwrap();
    assert_eq!(report.removed.len(), 2);
    assert!(h.mindia.media().get(&a.path).await.unwrap().derived_medias.is_empty());
    assert_eq!(h.cache.paths(), vec![path("/pics/abc_scale,w_10.webp")]);

    let ab_record = h.mindia.media().get(&ab.path).await.unwrap();
    assert_eq!(ab_record.derived_medias.len(), 1);
    assert_eq!(ab_record.derived_medias[0].path, path("/pics/abc_scale,w_10.webp"));

    h.mindia.media().delete(&a.path).await.unwrap();
    assert_eq!(h.cache.paths(), vec![path("/pics/abc_scale,w_10.webp")]);
}

#[tokio::test]
async fn rebuilding_a_variant_is_byte_identical() {
    let h = harness();
    let media = h
        .mindia
        .media()
        .upload(path("/users/a.png"), png(40, 20), ContentType::ImagePng, &[])
        .await
        .unwrap();

    let first = read_all(h.mindia.media().download(&media.path, "c_scale,w_10").await.unwrap()).await;
    assert_eq!(h.cache.len(), 1);

    h.mindia.media().clear_cache(&media.path).await.unwrap();
    assert!(h.cache.is_empty());

    let second = read_all(h.mindia.media().download(&media.path, "c_scale,w_10").await.unwrap()).await;
    assert_eq!(first, second);
    assert_eq!(h.cache.len(), 1);
    assert_eq!(h.mindia.media().get(&media.path).await.unwrap().derived_medias.len(), 1);
}

#[tokio::test]
async fn named_transformations_are_validated() {
    let h = harness();
    let named = h.mindia.named();

    let err = named.create("broken", "c_bogus,w_1").await.unwrap_err();
    assert!(matches!(
        transform_kind(&err),
        Some(TransformErrorKind::TransformationNotFound(name)) if name == "c_bogus"
    ));

    let err = named.create("nested", "t_thumb").await.unwrap_err();
    assert!(matches!(
        transform_kind(&err),
        Some(TransformErrorKind::TransformationNotFound(_))
    ));

    let err = named.create("a/b", "c_scale,w_1").await.unwrap_err();
    assert!(matches!(
        transform_kind(&err),
        Some(TransformErrorKind::InvalidArgument { name, .. }) if name == "name"
    ));

    let err = named.update("ghost", "c_scale,w_1").await.unwrap_err();
    assert!(matches!(
        transform_kind(&err),
        Some(TransformErrorKind::NamedTransformationNotFound(name)) if name == "ghost"
    ));
    assert!(named.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn named_transformation_lifecycle() {
    let h = harness();
    let named = h.mindia.named();

    let created = named.create("thumb", "c_scale,w_10").await.unwrap();
    let updated = named.upsert("thumb", "c_scale,w_20").await.unwrap();
    assert_eq!(updated.created_at(), created.created_at());
    assert_eq!(updated.transformations(), "c_scale,w_20");

    named.create("wide", "c_scale,w_400").await.unwrap();
    let names: Vec<_> = named
        .list()
        .await
        .unwrap()
        .iter()
        .map(|n| n.name().clone())
        .collect();
    assert_eq!(names, ["thumb", "wide"]);

    named.delete("thumb").await.unwrap();
    assert!(named.get("thumb").await.unwrap().is_none());
    named.delete_all().await.unwrap();
    assert!(named.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn colorize_without_a_client_is_unavailable() {
    let h = harness();
    let err = h.mindia.media().colorize(&path("/a.webp")).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        MindiaErrorKind::Scheduler(e) if matches!(e.kind, SchedulerErrorKind::PluginNotFound(_))
    ));
    assert_eq!(h.tasks.queued(), 0);
}

struct StartingClient;

#[async_trait]
impl PredictionClient for StartingClient {
    async fn create(&self, _image_url: &str) -> MindiaResult<Prediction> {
        Ok(Prediction {
            id: "pred-7".into(),
            status: PredictionStatus::Starting,
            output: None,
            error: None,
        })
    }

    async fn get(&self, id: &str) -> MindiaResult<Prediction> {
        self.create(id).await
    }

    async fn fetch_output(&self, _url: &str) -> MindiaResult<Bytes> {
        Ok(Bytes::new())
    }
}

#[tokio::test]
async fn colorize_queues_a_started_task() {
    let h = harness_with(Some(Arc::new(StartingClient)));
    let media = h
        .mindia
        .media()
        .upload(path("/old/photo.png"), png(8, 8), ContentType::ImagePng, &[])
        .await
        .unwrap();

    let task = h
        .mindia
        .media()
        .colorize(&media.path)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(task.name, "colorize");
    assert_eq!(task.status, mindia::TaskStatus::Processing);
    assert_eq!(h.tasks.queued(), 1);
    assert_eq!(h.mindia.task(&task.id).await.unwrap(), Some(task));
    assert_eq!(h.mindia.tasks().await.unwrap().len(), 1);
    assert_eq!(h.mindia.metrics().tasks_created(), 1);
}
