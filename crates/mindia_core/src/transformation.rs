//! Transformation operations and stored named aliases.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Path segments starting with this marker refer to a named transformation.
pub const NAMED_TRANSFORMATION_PREFIX: &str = "t_";

/// One operation parsed from a transformation segment.
///
/// # Examples
///
/// ```
/// use mindia_core::Transformation;
///
/// let t = Transformation::new("c_scale", [("w", "100"), ("h", "oops")]);
/// assert_eq!(t.dimension("w"), 100);
/// assert_eq!(t.dimension("h"), 0);
/// assert_eq!(t.to_string(), "c_scale,h_oops,w_100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Transformation {
    /// Operation name, e.g. `c_scale`
    name: String,
    /// Named arguments
    args: BTreeMap<String, String>,
}

impl Transformation {
    /// Create a transformation from a name and argument pairs.
    pub fn new<K, V>(name: impl Into<String>, args: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            args: args
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Whether this operation is `name`.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Raw argument value.
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// Numeric argument, `0` when missing or unparsable.
    pub fn dimension(&self, key: &str) -> u32 {
        self.arg(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Transformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.args {
            write!(f, ",{}_{}", key, value)?;
        }
        Ok(())
    }
}

/// A stored alias that expands to one or more transformation segments.
///
/// # Examples
///
/// ```
/// use mindia_core::NamedTransformation;
///
/// let named = NamedTransformation::new("sq", "c_scale,w_100,h_100");
/// assert_eq!(named.reference(), "t_sq");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct NamedTransformation {
    /// Alias name, without the `t_` marker
    name: String,
    /// Transformation string the alias expands to
    transformations: String,
    /// Creation time
    created_at: DateTime<Utc>,
    /// Last update time
    updated_at: DateTime<Utc>,
}

impl NamedTransformation {
    /// Create a new alias stamped with the current time.
    pub fn new(name: impl Into<String>, transformations: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            transformations: transformations.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the expansion, keeping the creation time.
    pub fn update(&mut self, transformations: impl Into<String>) {
        self.transformations = transformations.into();
        self.updated_at = Utc::now();
    }

    /// Path segment referring to this alias.
    pub fn reference(&self) -> String {
        format!("{}{}", NAMED_TRANSFORMATION_PREFIX, self.name)
    }
}
