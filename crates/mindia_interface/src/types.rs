//! Value types exchanged with collaborators.

use derive_getters::Getters;
use mindia_core::{ContentType, MediaPath, SortKey};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio::io::AsyncRead;

/// An owned, not yet consumed byte stream.
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

/// Result of downloading an object from a byte store.
pub struct Download {
    /// Location the bytes were read from
    pub path: MediaPath,
    /// Stored content type
    pub content_type: ContentType,
    /// Size in bytes as reported by the store
    pub content_length: u64,
    /// Object contents
    pub body: ByteStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("path", &self.path)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Paginated media listing request.
///
/// # Examples
///
/// ```
/// use mindia_core::{MediaPath, SortKey};
/// use mindia_interface::MediaQueryBuilder;
///
/// let query = MediaQueryBuilder::default()
///     .prefix(MediaPath::new("/users").unwrap())
///     .limit(20usize)
///     .sort(SortKey::ContentLength)
///     .build()
///     .unwrap();
/// assert_eq!(*query.offset(), 0);
/// assert!(!query.ascending());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
pub struct MediaQuery {
    /// Only records whose path starts with this prefix
    #[builder(default = "MediaPath::root()")]
    prefix: MediaPath,
    /// Number of matching records to skip
    #[builder(default)]
    offset: usize,
    /// Maximum number of records returned
    #[builder(default = "50")]
    limit: usize,
    /// Sort key
    #[builder(default)]
    sort: SortKey,
    /// Sort ascending instead of descending
    #[builder(default)]
    ascending: bool,
}

impl MediaQuery {
    /// Everything under `prefix`, newest first.
    pub fn under(prefix: MediaPath) -> Self {
        Self {
            prefix,
            offset: 0,
            limit: usize::MAX,
            sort: SortKey::CreatedAt,
            ascending: false,
        }
    }
}
