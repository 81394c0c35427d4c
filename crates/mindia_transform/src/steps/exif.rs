//! Best-effort EXIF extraction.

use async_trait::async_trait;
use exif::{Exif, In, Reader, Tag, Value};
use mindia_core::Metadata;
use mindia_error::MindiaResult;
use mindia_pipeline::{PipelineContext, Step};
use std::io::Cursor;

/// Copies well-known EXIF fields into the context metadata.
///
/// Content without readable EXIF leaves the metadata untouched; only a
/// missing buffer is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifStep;

impl ExifStep {
    /// Extract metadata from raw image bytes.
    ///
    /// Returns an empty map when the bytes carry no EXIF block.
    pub fn extract(bytes: &[u8]) -> Metadata {
        match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => collect(&exif),
            Err(e) => {
                tracing::debug!(error = %e, "No readable EXIF data");
                Metadata::new()
            }
        }
    }
}

#[async_trait]
impl Step for ExifStep {
    fn name(&self) -> &str {
        "exif"
    }

    #[tracing::instrument(skip(self, ctx), fields(path = %ctx.path))]
    async fn run(&self, ctx: &mut PipelineContext) -> MindiaResult<()> {
        let bytes = ctx.bytes().await?;
        let metadata = Self::extract(&bytes);
        tracing::debug!(fields = metadata.len(), "Extracted EXIF metadata");
        ctx.embedded_metadata.extend(metadata);
        Ok(())
    }
}

fn collect(exif: &Exif) -> Metadata {
    let mut metadata = Metadata::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            metadata.insert(key.to_string(), value);
        }
    };

    put("exif_version", text(exif, Tag::ExifVersion));
    put("make", text(exif, Tag::Make));
    put("model", text(exif, Tag::Model));

    if let Some((num, denom)) = first_rational(exif, Tag::FocalLength) {
        put("focal_numerator", Some(num.to_string()));
        put("focal_denominator", Some(denom.to_string()));
    }

    put(
        "taken",
        text(exif, Tag::DateTimeOriginal).or_else(|| text(exif, Tag::DateTime)),
    );
    put(
        "lat",
        coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, 'S').map(|v| v.to_string()),
    );
    put(
        "long",
        coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, 'W').map(|v| v.to_string()),
    );
    put("color_space", text(exif, Tag::ColorSpace));
    put("f_number", text(exif, Tag::FNumber));

    metadata
}

fn text(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY).map(|field| {
        field
            .display_value()
            .to_string()
            .trim()
            .trim_matches('"')
            .to_string()
    })
}

fn first_rational(exif: &Exif, tag: Tag) -> Option<(u32, u32)> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => values.first().map(|r| (r.num, r.denom)),
        _ => None,
    }
}

/// Degrees/minutes/seconds to signed decimal degrees.
fn coordinate(exif: &Exif, tag: Tag, reference: Tag, negative: char) -> Option<f64> {
    let Value::Rational(parts) = &exif.get_field(tag, In::PRIMARY)?.value else {
        return None;
    };
    let decimal = parts
        .iter()
        .take(3)
        .zip([1.0, 60.0, 3600.0])
        .map(|(part, divisor)| part.to_f64() / divisor)
        .sum::<f64>();

    let flipped = text(exif, reference).is_some_and(|r| r.starts_with(negative));
    Some(if flipped { -decimal } else { decimal })
}
