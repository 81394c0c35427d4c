//! The record that flows through a pipeline.

use crate::Buffer;
use bytes::Bytes;
use mindia_core::{ContentType, MediaPath, Metadata, Tag};
use mindia_error::{MindiaResult, PipelineError, PipelineErrorKind};

/// Mutable state carried from the source, through each step, to the sink.
#[derive(Debug)]
pub struct PipelineContext {
    /// Where the content belongs; steps may rewrite the extension
    pub path: MediaPath,
    /// Content bytes, populated by the source
    pub buffer: Option<Buffer>,
    /// Type of the current content
    pub content_type: ContentType,
    /// Metadata extracted along the way
    pub embedded_metadata: Metadata,
    /// Labels attached along the way
    pub tags: Vec<Tag>,
}

impl PipelineContext {
    /// Context for content at `path` with no buffer yet.
    pub fn new(path: MediaPath, content_type: ContentType) -> Self {
        Self {
            path,
            buffer: None,
            content_type,
            embedded_metadata: Metadata::new(),
            tags: Vec::new(),
        }
    }

    /// Attach a buffer.
    pub fn with_buffer(mut self, buffer: Buffer) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// The buffer, or an error if the source never provided one.
    pub fn buffer_mut(&mut self) -> MindiaResult<&mut Buffer> {
        self.buffer
            .as_mut()
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::SourceMissingBuffer).into())
    }

    /// Complete content bytes.
    pub async fn bytes(&mut self) -> MindiaResult<Bytes> {
        self.buffer_mut()?.bytes().await
    }

    /// Replace the content, its type and its path extension in one go.
    pub fn replace_content(&mut self, bytes: impl Into<Bytes>, content_type: ContentType) {
        if let Some(ext) = content_type.extension() {
            self.path = self.path.set_extension(ext);
        }
        self.buffer = Some(Buffer::from_bytes(bytes));
        self.content_type = content_type;
    }
}
