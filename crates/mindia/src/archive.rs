//! Zip archives of several media objects.

use bytes::Bytes;
use mindia_core::MediaPath;
use mindia_error::{MediaError, MediaErrorKind, MindiaError, MindiaResult};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundle `entries` into a zip archive, one file per entry.
///
/// Entries are named by their media path without the leading `/`.
pub(crate) fn zip_entries(entries: &[(MediaPath, Bytes)]) -> MindiaResult<Bytes> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, body) in entries {
        writer
            .start_file(entry_name(path), options)
            .map_err(archive_error)?;
        writer.write_all(body).map_err(archive_error)?;
    }

    let cursor = writer.finish().map_err(archive_error)?;
    Ok(Bytes::from(cursor.into_inner()))
}

fn entry_name(path: &MediaPath) -> &str {
    path.as_str().trim_start_matches('/')
}

fn archive_error(e: impl std::fmt::Display) -> MindiaError {
    MediaError::new(MediaErrorKind::Archive(e.to_string())).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn entries_are_named_without_leading_slash() {
        let entries = vec![
            (MediaPath::new("/users/a.webp").unwrap(), Bytes::from_static(b"first")),
            (MediaPath::new("/b.mp4").unwrap(), Bytes::from_static(b"second")),
        ];
        let archive = zip_entries(&entries).unwrap();

        let mut zip = ZipArchive::new(Cursor::new(archive.to_vec())).unwrap();
        assert_eq!(zip.len(), 2);

        let mut body = String::new();
        zip.by_name("users/a.webp").unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "first");
        assert!(zip.by_name("b.mp4").is_ok());
    }

    #[test]
    fn empty_archive_is_valid() {
        let archive = zip_entries(&[]).unwrap();
        assert!(ZipArchive::new(Cursor::new(archive.to_vec())).unwrap().is_empty());
    }
}
