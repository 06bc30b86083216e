use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::{Head, HeaderEncoder, MessageEncoder, Outbound};
use crate::protocol::SendError;

/// Buffered write half of a connection.
///
/// Encoding only appends to the buffer; nothing reaches the socket before
/// [`flush`](Self::flush), or before the buffer grows past its high water mark
/// on one of the async writes.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
    buffer: BytesMut,
    high_water_mark: usize,
    head_encoder: HeaderEncoder,
    body_encoder: MessageEncoder,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(buffer_size),
            high_water_mark: buffer_size,
            head_encoder: HeaderEncoder,
            body_encoder: MessageEncoder::new(),
        }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }

    #[inline]
    pub fn chunks_finished(&self) -> bool {
        self.body_encoder.chunks_finished()
    }

    #[inline]
    pub fn write_head(&mut self, head: Head<'_>) -> Result<(), SendError> {
        self.head_encoder.encode(head, &mut self.buffer)
    }

    #[inline]
    pub fn write_body(&mut self, item: Outbound<'_>) -> Result<(), SendError> {
        self.body_encoder.encode(item, &mut self.buffer)
    }

    /// Flushes only once the buffer has reached the high water mark.
    pub async fn flush_if_full(&mut self) -> Result<(), SendError> {
        if self.buffer.len() < self.high_water_mark {
            return Ok(());
        }
        self.flush().await
    }

    pub async fn flush(&mut self) -> Result<(), SendError> {
        if !self.buffer.is_empty() {
            trace!(len = self.buffer.len(), "flush write buffer");
            self.writer.write_all(self.buffer.as_ref()).await?;
            self.buffer.clear();
        }

        Ok(self.writer.flush().await?)
    }

    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.flush().await?;
        Ok(self.writer.shutdown().await?)
    }
}
