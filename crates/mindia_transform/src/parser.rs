//! The transformation string grammar.
//!
//! ```text
//! transformations := segment ("/" segment)*
//! segment         := name ("," key "_" value)*
//! ```
//!
//! Only the first `_` of a pair separates key from value. Pairs without a
//! `_` are dropped, and empty segments are skipped.

use mindia_core::Transformation;

/// Separates transformation segments.
pub const SEGMENT_SEPARATOR: char = '/';
/// Separates the name and the argument pairs of a segment.
pub const ARG_SEPARATOR: char = ',';
/// Separates key and value inside an argument pair.
pub const VALUE_SEPARATOR: char = '_';

/// Parse a resolved transformation string, preserving segment order.
///
/// # Examples
///
/// ```
/// use mindia_transform::parse;
///
/// let ops = parse("c_scale,w_100,h_50/c_watermark,o_@@logo.png,a_center");
/// assert_eq!(ops.len(), 2);
/// assert_eq!(ops[0].name(), "c_scale");
/// assert_eq!(ops[0].arg("w"), Some("100"));
/// assert_eq!(ops[1].arg("o"), Some("@@logo.png"));
/// ```
pub fn parse(transformations: &str) -> Vec<Transformation> {
    transformations
        .split(SEGMENT_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .map(parse_segment)
        .collect()
}

/// Parse one segment into its name and arguments.
pub fn parse_segment(segment: &str) -> Transformation {
    let mut parts = segment.split(ARG_SEPARATOR);
    let name = parts.next().unwrap_or_default().trim();
    let args = parts.filter_map(|pair| {
        let parsed = pair.split_once(VALUE_SEPARATOR);
        if parsed.is_none() {
            tracing::trace!(pair, "Dropping argument without value");
        }
        parsed
    });
    Transformation::new(name, args)
}
