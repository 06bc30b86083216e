//! Decoder for bodies delimited by a Content-Length header.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

/// Yields at most `length` bytes, then [`PayloadItem::Eof`].
///
/// Bytes beyond the declared length are left in the buffer untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    /// Bytes still expected from the peer
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let len = usize::try_from(self.remaining).unwrap_or(usize::MAX).min(src.len());
        let bytes = src.split_to(len).freeze();

        self.remaining -= len as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }
}
