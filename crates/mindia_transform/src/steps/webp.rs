//! Format normalization to WebP.

use super::codec::{blocking, decode, encode_webp};
use async_trait::async_trait;
use mindia_core::ContentType;
use mindia_error::{MindiaResult, TransformError, TransformErrorKind};
use mindia_pipeline::{PipelineContext, Step};

/// Re-encodes JPEG and PNG content as WebP; WebP passes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebpStep;

#[async_trait]
impl Step for WebpStep {
    fn name(&self) -> &str {
        "webp"
    }

    #[tracing::instrument(skip(self, ctx), fields(path = %ctx.path, content_type = %ctx.content_type))]
    async fn run(&self, ctx: &mut PipelineContext) -> MindiaResult<()> {
        match ctx.content_type {
            ContentType::ImageWebp => Ok(()),
            ContentType::ImageJpeg | ContentType::ImagePng => {
                let bytes = ctx.bytes().await?;
                let before = bytes.len();
                let encoded = blocking(move || encode_webp(&decode(&bytes)?)).await?;
                tracing::debug!(before, after = encoded.len(), "Converted to WebP");
                ctx.replace_content(encoded, ContentType::ImageWebp);
                Ok(())
            }
            ref other => Err(TransformError::new(TransformErrorKind::UnsupportedContentType(
                other.to_string(),
            ))
            .into()),
        }
    }
}
