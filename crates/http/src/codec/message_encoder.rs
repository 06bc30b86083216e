//! Body encoder for the write half of a connection.
//!
//! Message heads are small and written straight into the write buffer by
//! [`HeaderEncoder`](super::HeaderEncoder); everything after the head goes
//! through this encoder so chunk framing state lives in one place.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::codec::body::ChunkedEncoder;
use crate::protocol::{PayloadItem, SendError};

/// One piece of outgoing body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outbound<'a> {
    /// Unframed bytes, for Content-Length or close delimited bodies
    Data(&'a [u8]),
    /// One chunk of a chunked body
    Chunk(&'a [u8]),
    /// Terminating zero-sized chunk and empty trailer
    LastChunk,
}

#[derive(Debug, Default)]
pub struct MessageEncoder {
    chunked: ChunkedEncoder,
}

impl MessageEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the last chunk has been written.
    pub fn chunks_finished(&self) -> bool {
        self.chunked.is_finish()
    }
}

impl Encoder<Outbound<'_>> for MessageEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Outbound<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Outbound::Data(data) => {
                dst.put_slice(data);
                Ok(())
            }
            Outbound::Chunk(data) => self.chunked.encode(PayloadItem::Chunk(data), dst),
            Outbound::LastChunk => self.chunked.encode(PayloadItem::<&[u8]>::Eof, dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_data_is_not_framed() {
        let mut encoder = MessageEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(Outbound::Data(b"0\r\n"), &mut dst).unwrap();
        assert_eq!(&dst[..], b"0\r\n");
        assert!(!encoder.chunks_finished());
    }

    #[test]
    fn chunk_after_last_chunk() {
        let mut encoder = MessageEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(Outbound::Chunk(b"abc"), &mut dst).unwrap();
        encoder.encode(Outbound::LastChunk, &mut dst).unwrap();
        assert!(encoder.chunks_finished());
        assert!(matches!(encoder.encode(Outbound::Chunk(b"x"), &mut dst), Err(SendError::ChunksFinished)));
        assert_eq!(&dst[..], b"3\r\nabc\r\n0\r\n\r\n");
    }
}
