//! Encoder for `Transfer-Encoding: chunked` bodies.
//!
//! Each [`PayloadItem::Chunk`] becomes one `<HEX>\r\n<data>\r\n` frame and
//! [`PayloadItem::Eof`] writes the last-chunk with an empty trailer. Empty
//! chunks are skipped, since a zero-sized frame would end the body early.

use std::io::Write;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{PayloadItem, SendError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkedEncoder {
    eof: bool,
    send_size: u64,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }

    /// Payload bytes framed so far, framing overhead excluded.
    pub fn send_size(&self) -> u64 {
        self.send_size
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            error!("attempting to write chunked body after the last chunk");
            return Err(SendError::ChunksFinished);
        }

        match item {
            PayloadItem::Chunk(mut data) => {
                let size = data.remaining();
                if size == 0 {
                    return Ok(());
                }

                dst.reserve(size + 20);
                write!(helper::Writer(dst), "{size:X}\r\n")?;
                while data.has_remaining() {
                    let chunk = data.chunk();
                    let len = chunk.len();
                    dst.put_slice(chunk);
                    data.advance(len);
                }
                dst.put_slice(b"\r\n");
                self.send_size += size as u64;
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.put_slice(b"0\r\n\r\n");
                Ok(())
            }
        }
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_chunks_in_hex() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(&b"hello"[..]), &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(&[b'x'; 26][..]), &mut dst).unwrap();
        encoder.encode(PayloadItem::<&[u8]>::Eof, &mut dst).unwrap();

        let mut expected = b"5\r\nhello\r\n1A\r\n".to_vec();
        expected.extend_from_slice(&[b'x'; 26]);
        expected.extend_from_slice(b"\r\n0\r\n\r\n");
        assert_eq!(&dst[..], &expected[..]);
        assert_eq!(encoder.send_size(), 31);
    }

    #[test]
    fn skips_empty_chunk() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(&b""[..]), &mut dst).unwrap();
        assert!(dst.is_empty());
        assert!(!encoder.is_finish());
    }

    #[test]
    fn rejects_writes_after_last_chunk() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::<&[u8]>::Eof, &mut dst).unwrap();
        assert!(encoder.is_finish());

        let result = encoder.encode(PayloadItem::Chunk(&b"late"[..]), &mut dst);
        assert!(matches!(result, Err(SendError::ChunksFinished)));

        let result = encoder.encode(PayloadItem::<&[u8]>::Eof, &mut dst);
        assert!(matches!(result, Err(SendError::ChunksFinished)));
        assert_eq!(&dst[..], b"0\r\n\r\n");
    }
}
