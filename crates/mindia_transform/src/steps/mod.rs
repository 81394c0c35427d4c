//! Built-in pipeline steps.

mod codec;
mod exif;
mod scale;
mod watermark;
mod webp;

pub use exif::ExifStep;
pub use scale::{CropStrategy, ScaleStep, parse_color};
pub use watermark::{OverlaySource, StorageOverlaySource, WatermarkStep};
pub use webp::WebpStep;
