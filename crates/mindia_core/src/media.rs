//! Media records and their derived variants.

use crate::{ContentType, MediaPath};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Embedded metadata extracted from media bytes (EXIF and similar).
pub type Metadata = BTreeMap<String, String>;

/// A classification label attached to media.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Tag {
    /// Label text
    value: String,
    /// Confidence in `[0, 1]`
    #[builder(default)]
    confidence_score: f32,
    /// Who produced the label
    #[builder(default)]
    provider: String,
}

/// Listing information about a stored object.
///
/// # Examples
///
/// ```
/// use mindia_core::{ContentType, FileInfo, MediaPath};
///
/// let info = FileInfo::new(MediaPath::new("/a.png").unwrap(), ContentType::ImagePng, 42);
/// assert_eq!(*info.content_length(), 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct FileInfo {
    /// Location of the object
    path: MediaPath,
    /// Stored content type
    content_type: ContentType,
    /// Size in bytes
    content_length: u64,
}

impl FileInfo {
    /// Create listing information.
    pub fn new(path: MediaPath, content_type: ContentType, content_length: u64) -> Self {
        Self {
            path,
            content_type,
            content_length,
        }
    }
}

/// A cached, transformed variant of a media object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMedia {
    /// Location in the cache store
    pub path: MediaPath,
    /// Content type of the variant
    pub content_type: ContentType,
    /// Size in bytes
    pub content_length: u64,
    /// When the variant was first recorded
    pub created_at: DateTime<Utc>,
    /// When the variant was last recorded
    pub updated_at: DateTime<Utc>,
}

impl From<FileInfo> for DerivedMedia {
    fn from(info: FileInfo) -> Self {
        let now = Utc::now();
        Self {
            path: info.path,
            content_type: info.content_type,
            content_length: info.content_length,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Durable record of an uploaded original.
///
/// # Examples
///
/// ```
/// use mindia_core::{ContentType, Media, MediaPath};
///
/// let media = Media::new(MediaPath::new("/a.jpg").unwrap(), ContentType::ImageJpeg, 1024);
/// assert!(media.derived_medias.is_empty());
/// assert_eq!(media.created_at, media.updated_at);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Location in the original-bytes store
    pub path: MediaPath,
    /// Stored content type
    pub content_type: ContentType,
    /// Size in bytes
    pub content_length: u64,
    /// Extracted metadata
    #[serde(default)]
    pub embedded_metadata: Metadata,
    /// Classification labels
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Cached variants, rebuilt from the cache store on every cache event
    #[serde(default)]
    pub derived_medias: Vec<DerivedMedia>,
    /// Upload time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Media {
    /// Create a record with no metadata, tags or variants.
    pub fn new(path: MediaPath, content_type: ContentType, content_length: u64) -> Self {
        let now = Utc::now();
        Self {
            path,
            content_type,
            content_length,
            embedded_metadata: Metadata::new(),
            tags: Vec::new(),
            derived_medias: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the variant list with `files`, keeping the original creation
    /// time of variants that were already known.
    pub fn replace_derived(&mut self, files: Vec<FileInfo>) {
        let previous = std::mem::take(&mut self.derived_medias);
        self.derived_medias = files
            .into_iter()
            .map(|info| {
                let mut derived = DerivedMedia::from(info);
                if let Some(known) = previous.iter().find(|d| d.path == derived.path) {
                    derived.created_at = known.created_at;
                }
                derived
            })
            .collect();
        self.touch();
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Sort order for paginated media listings.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Sort by upload time
    #[default]
    #[display("created_at")]
    CreatedAt,
    /// Sort by size
    #[display("content_length")]
    ContentLength,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortKey::CreatedAt),
            "content_length" => Ok(SortKey::ContentLength),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_derived_keeps_known_creation_time() {
        let mut media = Media::new(
            MediaPath::new("/a.jpg").unwrap(),
            ContentType::ImageJpeg,
            10,
        );
        let info = FileInfo::new(MediaPath::new("/ac_x.jpg").unwrap(), ContentType::ImageWebp, 5);
        media.replace_derived(vec![info.clone()]);
        let first = media.derived_medias[0].created_at;

        let other = FileInfo::new(MediaPath::new("/ac_y.jpg").unwrap(), ContentType::ImageWebp, 6);
        media.replace_derived(vec![info, other]);
        assert_eq!(media.derived_medias.len(), 2);
        assert_eq!(media.derived_medias[0].created_at, first);
    }

    #[test]
    fn tag_builder_defaults() {
        let tag = TagBuilder::default().value("cat").build().unwrap();
        assert_eq!(tag.value(), "cat");
        assert_eq!(*tag.confidence_score(), 0.0);
    }
}
