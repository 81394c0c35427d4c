//! Tests for resolving, building and running transformation steps.

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use mindia_core::{Anchor, ContentType, MediaPath, NamedTransformation};
use mindia_error::{MindiaErrorKind, TransformErrorKind};
use mindia_interface::FileStorage;
use mindia_pipeline::{Buffer, PipelineContext, Step};
use mindia_storage::{MemoryFileStorage, MemoryNamedTransformationStorage};
use mindia_transform::{
    ExifStep, NamedTransformationResolver, StepRegistry, StorageOverlaySource, Transformer,
    WebpStep, parse, split_request_path,
};
use std::io::Cursor;
use std::sync::Arc;

fn png(width: u32, height: u32, color: [u8; 4]) -> Bytes {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    Bytes::from(out)
}

fn context(path: &str, content_type: ContentType, bytes: Bytes) -> PipelineContext {
    PipelineContext::new(MediaPath::new(path).unwrap(), content_type)
        .with_buffer(Buffer::from_bytes(bytes))
}

fn transform_kind(err: &mindia_error::MindiaError) -> TransformErrorKind {
    match err.kind() {
        MindiaErrorKind::Transform(e) => e.kind.clone(),
        other => panic!("expected transform error, got {:?}", other),
    }
}

fn transformer(named: Vec<NamedTransformation>, overlays: Arc<MemoryFileStorage>) -> Transformer {
    let storage = Arc::new(MemoryNamedTransformationStorage::with_entries(named));
    Transformer::new(
        NamedTransformationResolver::new(storage),
        StepRegistry::with_builtins(Arc::new(StorageOverlaySource::new(overlays))),
    )
}

async fn run(steps: &[Box<dyn Step>], mut ctx: PipelineContext) -> PipelineContext {
    for step in steps {
        step.run(&mut ctx).await.unwrap();
    }
    ctx
}

async fn decoded(ctx: &mut PipelineContext) -> DynamicImage {
    image::load_from_memory(&ctx.bytes().await.unwrap()).unwrap()
}

#[tokio::test]
async fn named_transformation_expands_in_place() {
    let t = transformer(
        vec![NamedTransformation::new("sq", "c_scale,w_100,h_100")],
        Arc::new(MemoryFileStorage::new()),
    );

    assert_eq!(t.resolve("t_sq").await.unwrap(), "c_scale,w_100,h_100");
    assert_eq!(
        t.resolve("c_scale,w_5/t_sq").await.unwrap(),
        "c_scale,w_5/c_scale,w_100,h_100"
    );
}

#[tokio::test]
async fn strings_without_aliases_are_unchanged() {
    let t = transformer(Vec::new(), Arc::new(MemoryFileStorage::new()));
    let raw = "c_scale,w_10,h_20/c_watermark,o_logo.png";
    assert_eq!(t.resolve(raw).await.unwrap(), raw);
}

#[tokio::test]
async fn unknown_alias_is_reported_by_name() {
    let t = transformer(Vec::new(), Arc::new(MemoryFileStorage::new()));

    let err = t.resolve("t_missing").await.unwrap_err();
    assert_eq!(
        transform_kind(&err),
        TransformErrorKind::NamedTransformationNotFound("missing".into())
    );
    assert!(err.is_not_found());

    let err = t.resolve("t_").await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(
        transform_kind(&err),
        TransformErrorKind::MalformedReference(_)
    ));
}

#[tokio::test]
async fn unknown_operation_aborts_the_whole_build() {
    let t = transformer(Vec::new(), Arc::new(MemoryFileStorage::new()));

    let err = t.prepare("c_scale,w_1/c_bogus,x_1").await.unwrap_err();
    assert_eq!(
        transform_kind(&err),
        TransformErrorKind::TransformationNotFound("c_bogus".into())
    );
}

#[tokio::test]
async fn watermark_arguments_are_validated_at_build_time() {
    let registry = StepRegistry::with_builtins(Arc::new(StorageOverlaySource::new(Arc::new(
        MemoryFileStorage::new(),
    ))));

    let err = registry.build(&parse("c_watermark,a_center")).err().unwrap();
    assert!(matches!(
        transform_kind(&err),
        TransformErrorKind::InvalidArgument { ref name, .. } if name == "o"
    ));

    let err = registry.build(&parse("c_watermark,o_x.png,a_sideways")).err().unwrap();
    assert!(matches!(
        transform_kind(&err),
        TransformErrorKind::InvalidArgument { ref name, .. } if name == "a"
    ));

    assert_eq!(registry.build(&parse("c_watermark,o_@@brand@@x.png")).unwrap().len(), 1);
    assert_eq!(registry.list(), ["c_scale", "c_watermark"]);
}

#[tokio::test]
async fn forced_scale_keeps_aspect_ratio() {
    let t = transformer(Vec::new(), Arc::new(MemoryFileStorage::new()));
    let prepared = t.prepare("c_scale,w_100,h_100").await.unwrap();

    let mut ctx = run(
        &prepared.steps,
        context("/a.png", ContentType::ImagePng, png(50, 200, [0, 0, 255, 255])),
    )
    .await;

    let img = decoded(&mut ctx).await;
    assert_eq!(img.dimensions(), (25, 100));
    assert_eq!(ctx.content_type, ContentType::ImageWebp);
    assert_eq!(ctx.path.as_str(), "/a.webp");
}

#[tokio::test]
async fn padded_scale_fills_the_box() {
    let t = transformer(Vec::new(), Arc::new(MemoryFileStorage::new()));
    let prepared = t
        .prepare("c_scale,w_100,h_100,a_pad_resize_crop,b_ffffff")
        .await
        .unwrap();

    let mut ctx = run(
        &prepared.steps,
        context("/a.png", ContentType::ImagePng, png(50, 200, [0, 0, 255, 255])),
    )
    .await;

    let img = decoded(&mut ctx).await.to_rgba8();
    assert_eq!(img.dimensions(), (100, 100));
    assert_eq!(img.get_pixel(2, 50), &Rgba([255, 255, 255, 255]));
}

#[tokio::test]
async fn zero_dimensions_leave_the_image_alone() {
    let t = transformer(Vec::new(), Arc::new(MemoryFileStorage::new()));
    let prepared = t.prepare("c_scale,w_abc").await.unwrap();

    let mut ctx = run(
        &prepared.steps,
        context("/a.png", ContentType::ImagePng, png(30, 20, [1, 2, 3, 255])),
    )
    .await;
    assert_eq!(decoded(&mut ctx).await.dimensions(), (30, 20));
}

#[tokio::test]
async fn watermark_composites_overlay_at_anchor() {
    let overlays = Arc::new(MemoryFileStorage::new());
    overlays
        .upload(
            &MediaPath::new("/brand/logo.png").unwrap(),
            png(40, 40, [255, 0, 0, 255]),
            &ContentType::ImagePng,
        )
        .await
        .unwrap();
    let t = transformer(Vec::new(), overlays);

    let prepared = t
        .prepare("c_watermark,o_@@brand@@logo.png,w_10,h_10,p_5,a_topleft")
        .await
        .unwrap();
    let mut ctx = run(
        &prepared.steps,
        context("/a.png", ContentType::ImagePng, png(100, 60, [0, 0, 0, 255])),
    )
    .await;

    let img = decoded(&mut ctx).await.to_rgba8();
    assert_eq!(img.dimensions(), (100, 60));
    assert_eq!(img.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
    assert_eq!(img.get_pixel(2, 2), &Rgba([0, 0, 0, 255]));
    assert_eq!(img.get_pixel(99, 59), &Rgba([0, 0, 0, 255]));
    assert_eq!(Anchor::default(), Anchor::BottomRight);
}

#[tokio::test]
async fn missing_overlay_fails_the_step() {
    let t = transformer(Vec::new(), Arc::new(MemoryFileStorage::new()));
    let prepared = t.prepare("c_watermark,o_nope.png").await.unwrap();

    let mut ctx = context("/a.png", ContentType::ImagePng, png(10, 10, [0, 0, 0, 255]));
    let err = prepared.steps[0].run(&mut ctx).await.unwrap_err();
    assert!(matches!(transform_kind(&err), TransformErrorKind::Overlay(_)));
}

#[tokio::test]
async fn exif_step_tolerates_images_without_exif() {
    let mut ctx = context("/a.png", ContentType::ImagePng, png(4, 4, [0, 0, 0, 255]));
    ExifStep.run(&mut ctx).await.unwrap();
    assert!(ctx.embedded_metadata.is_empty());
}

#[tokio::test]
async fn webp_step_converts_and_rejects() {
    let mut ctx = context("/dir/a.png", ContentType::ImagePng, png(4, 4, [9, 9, 9, 255]));
    WebpStep.run(&mut ctx).await.unwrap();
    assert_eq!(ctx.content_type, ContentType::ImageWebp);
    assert_eq!(ctx.path.as_str(), "/dir/a.webp");
    assert_eq!(
        image::guess_format(&ctx.bytes().await.unwrap()).unwrap(),
        ImageFormat::WebP
    );

    let mut ctx = context("/a.mp4", ContentType::VideoMp4, Bytes::from_static(b"video"));
    let err = WebpStep.run(&mut ctx).await.unwrap_err();
    assert!(matches!(
        transform_kind(&err),
        TransformErrorKind::UnsupportedContentType(_)
    ));
}

#[test]
fn request_paths_split_into_transformation_and_media() {
    let (transformations, path) = split_request_path("/users/c_scale,w_10/t_sq/a.jpg").unwrap();
    assert_eq!(transformations, "c_scale,w_10/t_sq");
    assert_eq!(path.as_str(), "/users/a.jpg");

    let (transformations, path) = split_request_path("/a.jpg").unwrap();
    assert!(transformations.is_empty());
    assert_eq!(path.as_str(), "/a.jpg");
}
