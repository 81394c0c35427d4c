//! Geometric scaling with a crop policy.

use super::codec::{blocking, decode, encode_webp, fit_image, size_of};
use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage, imageops};
use mindia_core::{ContentType, Size};
use mindia_error::MindiaResult;
use mindia_pipeline::{PipelineContext, Step};

/// What happens when the fitted image does not fill the requested box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CropStrategy {
    /// Keep the fitted size
    #[default]
    #[display("forced")]
    Forced,
    /// Pad with the background color to exactly the requested size
    #[display("pad_resize_crop")]
    PadResizeCrop,
}

impl CropStrategy {
    /// Lenient parse: unknown values mean [`CropStrategy::Forced`].
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("pad") | Some("pad_resize_crop") => CropStrategy::PadResizeCrop,
            _ => CropStrategy::Forced,
        }
    }
}

/// Parse a `rgb`, `rrggbb` or `rrggbbaa` hex color, with or without `#`.
///
/// # Examples
///
/// ```
/// use mindia_transform::parse_color;
///
/// assert_eq!(parse_color("#ff8000").map(|c| c.0), Some([255, 128, 0, 255]));
/// assert_eq!(parse_color("fff").map(|c| c.0), Some([255, 255, 255, 255]));
/// assert!(parse_color("nope").is_none());
/// ```
pub fn parse_color(hex: &str) -> Option<Rgba<u8>> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 | 8 => {
            let alpha = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
            Some(Rgba([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                alpha,
            ]))
        }
        _ => None,
    }
}

/// Fits the image into a box and re-encodes it as WebP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleStep {
    size: Size,
    crop: CropStrategy,
    background: Rgba<u8>,
}

impl ScaleStep {
    /// Default background for padding: opaque black.
    pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

    /// Step scaling into `size` with the given crop policy.
    pub fn new(size: Size, crop: CropStrategy) -> Self {
        Self {
            size,
            crop,
            background: Self::DEFAULT_BACKGROUND,
        }
    }

    /// Use `background` when padding.
    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    /// Requested box.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Crop policy.
    pub fn crop(&self) -> CropStrategy {
        self.crop
    }

    /// Apply the scale to a decoded image.
    pub fn apply(&self, img: DynamicImage) -> DynamicImage {
        let fitted = fit_image(img, self.size);
        let actual = size_of(&fitted);

        let pad = self.crop == CropStrategy::PadResizeCrop
            && self.size.width != 0
            && self.size.height != 0
            && actual != self.size;
        if !pad {
            return fitted;
        }

        let mut canvas = RgbaImage::from_pixel(self.size.width, self.size.height, self.background);
        let x = i64::from(self.size.width / 2) - i64::from(actual.width / 2);
        let y = i64::from(self.size.height / 2) - i64::from(actual.height / 2);
        imageops::overlay(&mut canvas, &fitted.to_rgba8(), x, y);
        DynamicImage::ImageRgba8(canvas)
    }
}

#[async_trait]
impl Step for ScaleStep {
    fn name(&self) -> &str {
        "c_scale"
    }

    #[tracing::instrument(
        skip(self, ctx),
        fields(path = %ctx.path, width = self.size.width, height = self.size.height, crop = %self.crop)
    )]
    async fn run(&self, ctx: &mut PipelineContext) -> MindiaResult<()> {
        let bytes = ctx.bytes().await?;
        let step = *self;
        let encoded = blocking(move || encode_webp(&step.apply(decode(&bytes)?))).await?;
        ctx.replace_content(encoded, ContentType::ImageWebp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_strategy_is_lenient() {
        assert_eq!(CropStrategy::parse(Some("pad")), CropStrategy::PadResizeCrop);
        assert_eq!(CropStrategy::parse(Some("pad_resize_crop")), CropStrategy::PadResizeCrop);
        assert_eq!(CropStrategy::parse(Some("zoom")), CropStrategy::Forced);
        assert_eq!(CropStrategy::parse(None), CropStrategy::Forced);
    }

    #[test]
    fn pad_centers_on_background() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(50, 200, Rgba([255, 255, 255, 255])));
        let step = ScaleStep::new(Size::new(100, 100), CropStrategy::PadResizeCrop)
            .with_background(Rgba([255, 0, 0, 255]));

        let out = step.apply(img).to_rgba8();
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.get_pixel(0, 50), &Rgba([255, 0, 0, 255]));
        assert_ne!(out.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
    }
}
