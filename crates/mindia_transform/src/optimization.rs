//! Normalization applied to uploads before they are stored.

use crate::steps::{ExifStep, WebpStep};
use mindia_core::ContentType;
use mindia_error::{MindiaResult, TransformError, TransformErrorKind};
use mindia_pipeline::Step;

/// Steps that normalize freshly uploaded content of `content_type`.
///
/// JPEG and PNG get EXIF extraction followed by WebP conversion. WebP and
/// video content is stored as is.
///
/// # Errors
///
/// Any other type fails with `UnsupportedContentType`.
///
/// # Examples
///
/// ```
/// use mindia_core::ContentType;
/// use mindia_transform::optimization_steps;
///
/// let names: Vec<_> = optimization_steps(&ContentType::ImagePng)
///     .unwrap()
///     .iter()
///     .map(|s| s.name().to_string())
///     .collect();
/// assert_eq!(names, ["exif", "webp"]);
/// assert!(optimization_steps(&ContentType::VideoMp4).unwrap().is_empty());
/// assert!(optimization_steps(&ContentType::from("text/plain")).is_err());
/// ```
pub fn optimization_steps(content_type: &ContentType) -> MindiaResult<Vec<Box<dyn Step>>> {
    match content_type {
        ContentType::ImageJpeg | ContentType::ImagePng => {
            Ok(vec![Box::new(ExifStep), Box::new(WebpStep)])
        }
        ContentType::ImageWebp | ContentType::VideoMp4 | ContentType::VideoMkv => Ok(Vec::new()),
        other => Err(TransformError::new(TransformErrorKind::UnsupportedContentType(
            other.to_string(),
        ))
        .into()),
    }
}
