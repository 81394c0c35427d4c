//! Overlay compositing.

use super::codec::{blocking, decode, encode_webp, fit_image, size_of};
use async_trait::async_trait;
use bytes::Bytes;
use image::imageops;
use mindia_core::{Anchor, ContentType, MediaPath, Size};
use mindia_error::{MindiaResult, TransformError, TransformErrorKind};
use mindia_interface::FileStorage;
use mindia_pipeline::{Buffer, PipelineContext, Step};
use std::sync::Arc;

/// Supplies overlay images for the watermark step.
#[async_trait]
pub trait OverlaySource: Send + Sync {
    /// Raw bytes of the overlay at `path`.
    async fn fetch(&self, path: &MediaPath) -> MindiaResult<Bytes>;
}

/// Reads overlays from a byte store.
#[derive(Clone)]
pub struct StorageOverlaySource {
    storage: Arc<dyn FileStorage>,
}

impl StorageOverlaySource {
    /// Overlay source backed by `storage`.
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl OverlaySource for StorageOverlaySource {
    async fn fetch(&self, path: &MediaPath) -> MindiaResult<Bytes> {
        let download = self.storage.download(path).await.map_err(|e| {
            TransformError::new(TransformErrorKind::Overlay(format!("{}: {}", path, e)))
        })?;
        Buffer::from_stream(download.body).bytes().await
    }
}

impl std::fmt::Debug for StorageOverlaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageOverlaySource").finish_non_exhaustive()
    }
}

/// Composites an overlay on the image at an anchor, then re-encodes as WebP.
#[derive(Clone)]
pub struct WatermarkStep {
    overlay_path: MediaPath,
    size: Size,
    anchor: Anchor,
    padding: u32,
    overlays: Arc<dyn OverlaySource>,
}

impl WatermarkStep {
    /// Watermark with the overlay at `overlay_path`, unscaled, at the default
    /// anchor with no padding.
    pub fn new(overlay_path: MediaPath, overlays: Arc<dyn OverlaySource>) -> Self {
        Self {
            overlay_path,
            size: Size::default(),
            anchor: Anchor::default(),
            padding: 0,
            overlays,
        }
    }

    /// Fit the overlay into `size` first. Only applies when both sides are set.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Place the overlay at `anchor`.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Keep `padding` pixels between the overlay and the anchored edges.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Path of the overlay image.
    pub fn overlay_path(&self) -> &MediaPath {
        &self.overlay_path
    }

    /// Anchor of the overlay.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }
}

#[async_trait]
impl Step for WatermarkStep {
    fn name(&self) -> &str {
        "c_watermark"
    }

    #[tracing::instrument(
        skip(self, ctx),
        fields(path = %ctx.path, overlay = %self.overlay_path, anchor = %self.anchor)
    )]
    async fn run(&self, ctx: &mut PipelineContext) -> MindiaResult<()> {
        let base = ctx.bytes().await?;
        let overlay = self.overlays.fetch(&self.overlay_path).await?;
        let (size, anchor, padding) = (self.size, self.anchor, self.padding);

        let encoded = blocking(move || {
            let base = decode(&base)?;
            let mut overlay = decode(&overlay)?;
            if size.width != 0 && size.height != 0 {
                overlay = fit_image(overlay, size);
            }

            let position = anchor.position(size_of(&base), size_of(&overlay), padding);
            let mut canvas = base.to_rgba8();
            imageops::overlay(&mut canvas, &overlay.to_rgba8(), position.x, position.y);
            encode_webp(&image::DynamicImage::ImageRgba8(canvas))
        })
        .await?;

        ctx.replace_content(encoded, ContentType::ImageWebp);
        Ok(())
    }
}

impl std::fmt::Debug for WatermarkStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkStep")
            .field("overlay_path", &self.overlay_path)
            .field("size", &self.size)
            .field("anchor", &self.anchor)
            .field("padding", &self.padding)
            .finish_non_exhaustive()
    }
}
