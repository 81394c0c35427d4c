//! MIME content types understood by the engine.

use serde::{Deserialize, Serialize};

/// Content type of a stored object.
///
/// # Examples
///
/// ```
/// use mindia_core::ContentType;
///
/// assert_eq!(ContentType::from("image/jpg"), ContentType::ImageJpeg);
/// assert_eq!(ContentType::ImageWebp.to_string(), "image/webp");
/// assert!(ContentType::VideoMp4.is_supported());
/// assert!(!ContentType::from("text/plain").is_supported());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    /// JPEG image (`image/jpeg`, also accepts `image/jpg`)
    #[display("image/jpeg")]
    ImageJpeg,
    /// PNG image
    #[display("image/png")]
    ImagePng,
    /// WebP image
    #[display("image/webp")]
    ImageWebp,
    /// MP4 video
    #[display("video/mp4")]
    VideoMp4,
    /// Matroska video
    #[display("video/x-matroska")]
    VideoMkv,
    /// Any other MIME type
    #[display("{_0}")]
    Other(String),
}

impl ContentType {
    /// Whether uploads of this type are accepted.
    pub fn is_supported(&self) -> bool {
        !matches!(self, ContentType::Other(_))
    }

    /// Whether the type is a still image.
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            ContentType::ImageJpeg | ContentType::ImagePng | ContentType::ImageWebp
        )
    }

    /// Canonical file extension, with its leading dot.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ContentType::ImageJpeg => Some(".jpg"),
            ContentType::ImagePng => Some(".png"),
            ContentType::ImageWebp => Some(".webp"),
            ContentType::VideoMp4 => Some(".mp4"),
            ContentType::VideoMkv => Some(".mkv"),
            ContentType::Other(_) => None,
        }
    }

    /// Guess a content type from a path extension such as `.png`.
    pub fn from_extension(ext: &str) -> ContentType {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => ContentType::ImageJpeg,
            "png" => ContentType::ImagePng,
            "webp" => ContentType::ImageWebp,
            "mp4" => ContentType::VideoMp4,
            "mkv" => ContentType::VideoMkv,
            _ => ContentType::Other("application/octet-stream".to_string()),
        }
    }
}

impl From<&str> for ContentType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => ContentType::ImageJpeg,
            "image/png" => ContentType::ImagePng,
            "image/webp" => ContentType::ImageWebp,
            "video/mp4" => ContentType::VideoMp4,
            "video/x-matroska" => ContentType::VideoMkv,
            _ => ContentType::Other(value.to_string()),
        }
    }
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        ContentType::from(value.as_str())
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping_is_consistent() {
        for ct in [
            ContentType::ImageJpeg,
            ContentType::ImagePng,
            ContentType::ImageWebp,
            ContentType::VideoMp4,
            ContentType::VideoMkv,
        ] {
            let ext = ct.extension().unwrap();
            assert_eq!(ContentType::from_extension(ext), ct);
        }
    }

    #[test]
    fn unknown_types_are_preserved() {
        let ct = ContentType::from("application/pdf");
        assert_eq!(ct.to_string(), "application/pdf");
        assert!(!ct.is_image());
        assert!(ct.extension().is_none());
    }
}
