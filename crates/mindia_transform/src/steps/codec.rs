//! Decoding, encoding and fitting shared by the image steps.

use image::{DynamicImage, ImageFormat};
use mindia_core::Size;
use mindia_error::{MindiaResult, PipelineError, PipelineErrorKind, TransformError, TransformErrorKind};
use std::io::Cursor;

/// Run CPU-bound image work off the async runtime.
pub(crate) async fn blocking<T, F>(work: F) -> MindiaResult<T>
where
    F: FnOnce() -> MindiaResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        PipelineError::new(PipelineErrorKind::Io(format!("Image task failed: {}", e)))
    })?
}

pub(crate) fn decode(bytes: &[u8]) -> MindiaResult<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| TransformError::new(TransformErrorKind::Decode(e.to_string())).into())
}

/// Lossless WebP; the encoder only accepts 8-bit RGB(A).
pub(crate) fn encode_webp(img: &DynamicImage) -> MindiaResult<Vec<u8>> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let mut out = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut out), ImageFormat::WebP)
        .map_err(|e| TransformError::new(TransformErrorKind::Encode(e.to_string())))?;
    Ok(out)
}

pub(crate) fn size_of(img: &DynamicImage) -> Size {
    Size::new(img.width(), img.height())
}

/// Largest size with the aspect ratio of `src` that fits inside `bounds`.
///
/// A zero bound leaves its axis unconstrained. Images already inside the
/// bounds keep their size.
pub(crate) fn fit(src: Size, bounds: Size) -> Size {
    let max_w = if bounds.width == 0 { src.width } else { bounds.width };
    let max_h = if bounds.height == 0 { src.height } else { bounds.height };

    if src.width == 0 || src.height == 0 || (src.width <= max_w && src.height <= max_h) {
        return src;
    }

    let src_aspect = f64::from(src.width) / f64::from(src.height);
    let max_aspect = f64::from(max_w) / f64::from(max_h);
    if src_aspect > max_aspect {
        let h = (f64::from(max_w) / src_aspect).round() as u32;
        Size::new(max_w, h.max(1))
    } else {
        let w = (f64::from(max_h) * src_aspect).round() as u32;
        Size::new(w.max(1), max_h)
    }
}

/// Resize to the fitted size, skipping the resample when nothing changes.
pub(crate) fn fit_image(img: DynamicImage, bounds: Size) -> DynamicImage {
    let src = size_of(&img);
    let target = fit(src, bounds);
    if target == src {
        img
    } else {
        img.resize_exact(target.width, target.height, image::imageops::FilterType::Lanczos3)
    }
}
