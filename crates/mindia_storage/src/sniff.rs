//! Content type detection for stored bytes.

use mindia_core::{ContentType, MediaPath};

/// Detect the content type of `head` (the first bytes of an object),
/// falling back to the path extension.
pub(crate) fn sniff(path: &MediaPath, head: &[u8]) -> ContentType {
    match image::guess_format(head) {
        Ok(image::ImageFormat::Jpeg) => ContentType::ImageJpeg,
        Ok(image::ImageFormat::Png) => ContentType::ImagePng,
        Ok(image::ImageFormat::WebP) => ContentType::ImageWebp,
        _ => ContentType::from_extension(path.extension()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_win_over_extension() {
        let path = MediaPath::new("/a.jpg").unwrap();
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(sniff(&path, &png_magic), ContentType::ImagePng);
        assert_eq!(sniff(&path, b"not an image"), ContentType::ImageJpeg);
    }
}
