//! Replayable byte buffer over a single-use stream.

use bytes::{Bytes, BytesMut};
use mindia_error::{MindiaResult, PipelineError, PipelineErrorKind};
use mindia_interface::ByteStream;
use std::io::Cursor;
use tokio::io::AsyncReadExt;

/// Lazily captures a byte stream so it can be read any number of times.
///
/// The underlying stream is consumed at most once. After the first full
/// read every accessor returns the same bytes. An empty stream yields an
/// empty buffer, which is not an error.
///
/// # Examples
///
/// ```
/// use mindia_pipeline::Buffer;
///
/// # async fn example() -> mindia_error::MindiaResult<()> {
/// let mut buffer = Buffer::from_stream(Box::pin(&b"hello"[..]));
/// assert_eq!(buffer.peek(2).await?, b"he");
/// assert_eq!(&buffer.bytes().await?[..], b"hello");
/// assert_eq!(buffer.len().await?, 5);
/// # Ok(())
/// # }
/// ```
pub struct Buffer {
    stream: Option<ByteStream>,
    head: BytesMut,
    complete: Option<Bytes>,
}

impl Buffer {
    /// Wrap a stream that has not been read yet.
    pub fn from_stream(stream: ByteStream) -> Self {
        Self {
            stream: Some(stream),
            head: BytesMut::new(),
            complete: None,
        }
    }

    /// Wrap bytes that are already in memory.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            stream: None,
            head: BytesMut::new(),
            complete: Some(bytes.into()),
        }
    }

    /// Complete content, reading the stream on first use.
    pub async fn bytes(&mut self) -> MindiaResult<Bytes> {
        if let Some(bytes) = &self.complete {
            return Ok(bytes.clone());
        }

        let mut rest = Vec::new();
        if let Some(mut stream) = self.stream.take() {
            stream
                .read_to_end(&mut rest)
                .await
                .map_err(|e| PipelineError::new(PipelineErrorKind::Io(e.to_string())))?;
        }

        let mut all = std::mem::take(&mut self.head);
        all.extend_from_slice(&rest);
        let bytes = all.freeze();
        tracing::trace!(size = bytes.len(), "Captured buffer");
        self.complete = Some(bytes.clone());
        Ok(bytes)
    }

    /// Captured size in bytes, reading the stream on first use.
    pub async fn len(&mut self) -> MindiaResult<u64> {
        Ok(self.bytes().await?.len() as u64)
    }

    /// Whether the captured content is empty.
    pub async fn is_empty(&mut self) -> MindiaResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Independent reader over the complete content.
    pub async fn reader(&mut self) -> MindiaResult<ByteStream> {
        let bytes = self.bytes().await?;
        Ok(Box::pin(Cursor::new(bytes)))
    }

    /// Up to `n` leading bytes, without capturing the rest of the stream.
    pub async fn peek(&mut self, n: usize) -> MindiaResult<&[u8]> {
        if self.complete.is_none() {
            if let Some(stream) = self.stream.as_mut() {
                while self.head.len() < n {
                    let mut chunk = vec![0u8; n - self.head.len()];
                    let read = stream
                        .read(&mut chunk)
                        .await
                        .map_err(|e| PipelineError::new(PipelineErrorKind::Io(e.to_string())))?;
                    if read == 0 {
                        break;
                    }
                    self.head.extend_from_slice(&chunk[..read]);
                }
            }
        }

        let available: &[u8] = match &self.complete {
            Some(bytes) => bytes,
            None => &self.head,
        };
        Ok(&available[..n.min(available.len())])
    }

    /// Consume the buffer into one reader: bytes read so far followed by
    /// whatever the stream has not yet produced.
    pub fn into_reader(self) -> ByteStream {
        match (self.complete, self.stream) {
            (Some(bytes), _) => Box::pin(Cursor::new(bytes)),
            (None, Some(stream)) => Box::pin(Cursor::new(self.head.freeze()).chain(stream)),
            (None, None) => Box::pin(Cursor::new(self.head.freeze())),
        }
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("captured", &self.complete.as_ref().map(Bytes::len))
            .field("head", &self.head.len())
            .field("pending_stream", &self.stream.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    /// Reader that counts how many times it is polled for data.
    struct CountingReader {
        inner: Cursor<Vec<u8>>,
        polls: Arc<AtomicUsize>,
    }

    impl AsyncRead for CountingReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    #[tokio::test]
    async fn stream_is_consumed_once() {
        let polls = Arc::new(AtomicUsize::new(0));
        let mut buffer = Buffer::from_stream(Box::pin(CountingReader {
            inner: Cursor::new(b"payload".to_vec()),
            polls: polls.clone(),
        }));

        let first = buffer.bytes().await.unwrap();
        let after_first = polls.load(Ordering::SeqCst);
        let second = buffer.bytes().await.unwrap();
        let mut replay = Vec::new();
        buffer.reader().await.unwrap().read_to_end(&mut replay).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(replay, b"payload");
        assert_eq!(polls.load(Ordering::SeqCst), after_first);
    }

    #[tokio::test]
    async fn empty_stream_is_valid() {
        let mut buffer = Buffer::from_stream(Box::pin(&b""[..]));
        assert!(buffer.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn merged_reader_keeps_peeked_bytes() {
        let mut buffer = Buffer::from_stream(Box::pin(&b"abcdef"[..]));
        assert_eq!(buffer.peek(3).await.unwrap(), b"abc");

        let mut all = Vec::new();
        buffer.into_reader().read_to_end(&mut all).await.unwrap();
        assert_eq!(all, b"abcdef");
    }

    #[tokio::test]
    async fn bytes_after_peek_are_complete() {
        let mut buffer = Buffer::from_stream(Box::pin(&b"abcdef"[..]));
        buffer.peek(4).await.unwrap();
        assert_eq!(&buffer.bytes().await.unwrap()[..], b"abcdef");
        assert_eq!(buffer.peek(100).await.unwrap(), b"abcdef");
    }
}
