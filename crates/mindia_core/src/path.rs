//! Absolute media paths and the derived-path naming scheme.

use mindia_error::{MediaError, MediaErrorKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const UUID_PATTERN: &str = "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}";

fn uuid_regex() -> &'static Regex {
    static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
    UUID_REGEX.get_or_init(|| Regex::new(UUID_PATTERN).expect("Valid UUID regex"))
}

/// An absolute, slash-delimited location of a media object or artifact.
///
/// A path always begins with `/`. Files are expected to carry an extension;
/// a path without one is treated as a directory.
///
/// # Examples
///
/// ```
/// use mindia_core::MediaPath;
///
/// let path = MediaPath::new("/users/picture.jpg").unwrap();
/// assert_eq!(path.dir(), "/users");
/// assert_eq!(path.basename(), "picture");
/// assert_eq!(path.extension(), ".jpg");
///
/// assert!(MediaPath::new("relative.jpg").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
#[display("{_0}")]
pub struct MediaPath(String);

impl MediaPath {
    /// Validate and wrap an absolute path.
    #[track_caller]
    pub fn new(path: impl Into<String>) -> Result<Self, MediaError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(MediaError::new(MediaErrorKind::InvalidPath(format!(
                "path can only be absolute: '{}'",
                path
            ))));
        }
        Ok(Self(path))
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// The raw path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path element, including its extension.
    pub fn filename(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        if trimmed.is_empty() {
            return "/";
        }
        trimmed.rfind('/').map_or(trimmed, |idx| &trimmed[idx + 1..])
    }

    /// Extension of the last element, with its leading dot, or `""`.
    pub fn extension(&self) -> &str {
        let filename = self.filename();
        if filename == "/" {
            return "";
        }
        filename.rfind('.').map_or("", |idx| &filename[idx..])
    }

    /// Directory holding the object.
    ///
    /// A path without an extension is its own directory.
    pub fn dir(&self) -> &str {
        if self.extension().is_empty() {
            return &self.0;
        }
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &trimmed[..idx],
        }
    }

    /// Filename without its extension.
    pub fn basename(&self) -> &str {
        let filename = self.filename();
        &filename[..filename.len() - self.extension().len()]
    }

    /// Embedded UUID found in the basename, if any.
    pub fn identifier(&self) -> Option<&str> {
        uuid_regex().find(self.basename()).map(|m| m.as_str())
    }

    /// Stem used to name derived variants: the identifier, or the whole
    /// basename when no identifier is embedded.
    pub fn stem(&self) -> &str {
        self.identifier().unwrap_or_else(|| self.basename())
    }

    /// Path of a derived variant named by `suffix`.
    ///
    /// Slashes in the suffix become dashes and `.webp` is removed, so the
    /// result stays a single element in the source directory and keeps the
    /// source extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use mindia_core::MediaPath;
    ///
    /// let path = MediaPath::new("/users/0b7e4f4c-7bd6-4a8a-9a8e-2f3c1f5e9d11.jpg").unwrap();
    /// let derived = path.append_suffix("c_scale,w_100/c_watermark");
    /// assert_eq!(
    ///     derived.as_str(),
    ///     "/users/0b7e4f4c-7bd6-4a8a-9a8e-2f3c1f5e9d11c_scale,w_100-c_watermark.jpg"
    /// );
    /// ```
    pub fn append_suffix(&self, suffix: &str) -> MediaPath {
        let suffix = suffix.replace('/', "-").replace(".webp", "");
        let name = format!("{}{}{}", self.stem(), suffix, self.extension());
        Self(join(self.dir(), &name))
    }

    /// Same object in the same directory with a different extension.
    pub fn set_extension(&self, ext: &str) -> MediaPath {
        let name = format!("{}{}", self.stem(), ext);
        Self(join(self.dir(), &name))
    }

    /// Same filename relocated into `dir`.
    pub fn with_dir(&self, dir: &MediaPath) -> MediaPath {
        Self(join(dir.as_str(), self.filename()))
    }

    /// Prefix shared by every derived variant of this path.
    ///
    /// Other objects can share the prefix too; filter listings with
    /// [`is_variant_of`](Self::is_variant_of).
    pub fn variant_prefix(&self) -> MediaPath {
        Self(join(self.dir(), self.stem()))
    }

    /// Whether this path names a derived variant of `source`.
    ///
    /// A variant sits in the same directory and its basename is the source
    /// stem followed by a transformation or plugin suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use mindia_core::MediaPath;
    ///
    /// let a = MediaPath::new("/pics/a.webp").unwrap();
    /// assert!(a.append_suffix("c_scale,w_10").is_variant_of(&a));
    /// assert!(!MediaPath::new("/pics/abc_scale,w_10.webp").unwrap().is_variant_of(&a));
    /// assert!(!MediaPath::new("/pics/a/bc_scale.webp").unwrap().is_variant_of(&a));
    /// ```
    pub fn is_variant_of(&self, source: &MediaPath) -> bool {
        if self.dir() != source.dir() {
            return false;
        }
        self.basename()
            .strip_prefix(source.stem())
            .is_some_and(|rest| VARIANT_MARKERS.iter().any(|marker| rest.starts_with(marker)))
    }
}

/// How a variant suffix can begin: an operation, a named alias, or a plugin.
const VARIANT_MARKERS: [&str; 3] = ["c_", "t_", "colorize"];

fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

impl TryFrom<String> for MediaPath {
    type Error = MediaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MediaPath> for String {
    fn from(path: MediaPath) -> Self {
        path.0
    }
}

impl std::str::FromStr for MediaPath {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for MediaPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
