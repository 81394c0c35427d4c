//! Sources and sinks backed by byte stores.

use crate::{Buffer, PipelineContext, Sink, Source};
use async_trait::async_trait;
use bytes::Bytes;
use mindia_core::{ContentType, MediaPath};
use mindia_error::MindiaResult;
use mindia_interface::FileStorage;
use std::sync::Arc;

/// Reads an object from a byte store.
pub struct StorageSource {
    storage: Arc<dyn FileStorage>,
    path: MediaPath,
}

impl StorageSource {
    /// Source reading `path` from `storage`.
    pub fn new(storage: Arc<dyn FileStorage>, path: MediaPath) -> Self {
        Self { storage, path }
    }
}

#[async_trait]
impl Source for StorageSource {
    async fn read(&self) -> MindiaResult<PipelineContext> {
        let download = self.storage.download(&self.path).await?;
        Ok(PipelineContext::new(download.path, download.content_type)
            .with_buffer(Buffer::from_stream(download.body)))
    }
}

/// Provides bytes that are already in memory, such as an upload body.
pub struct BytesSource {
    path: MediaPath,
    content_type: ContentType,
    body: Bytes,
}

impl BytesSource {
    /// Source yielding `body` as content of type `content_type` at `path`.
    pub fn new(path: MediaPath, content_type: ContentType, body: impl Into<Bytes>) -> Self {
        Self {
            path,
            content_type,
            body: body.into(),
        }
    }
}

#[async_trait]
impl Source for BytesSource {
    async fn read(&self) -> MindiaResult<PipelineContext> {
        Ok(
            PipelineContext::new(self.path.clone(), self.content_type.clone())
                .with_buffer(Buffer::from_bytes(self.body.clone())),
        )
    }
}

/// Writes the final content into a byte store.
///
/// Without a destination the content is written at the context path;
/// with one, the context path is rewritten to the destination first.
pub struct StorageSink {
    storage: Arc<dyn FileStorage>,
    destination: Option<MediaPath>,
}

impl StorageSink {
    /// Sink writing at whatever path the context ends up with.
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self {
            storage,
            destination: None,
        }
    }

    /// Sink writing at a fixed `destination`.
    pub fn at(storage: Arc<dyn FileStorage>, destination: MediaPath) -> Self {
        Self {
            storage,
            destination: Some(destination),
        }
    }
}

#[async_trait]
impl Sink for StorageSink {
    #[tracing::instrument(skip(self, ctx), fields(path = %ctx.path))]
    async fn write(&self, ctx: &mut PipelineContext) -> MindiaResult<()> {
        if let Some(destination) = &self.destination {
            ctx.path = destination.clone();
        }
        let body = ctx.bytes().await?;
        self.storage
            .upload(&ctx.path, body, &ctx.content_type)
            .await
    }
}
