//! Decoder for `Transfer-Encoding: chunked` bodies.
//!
//! Wire format, per [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1):
//!
//! ```text
//! <hex size>[;extensions]CRLF
//! <size bytes>CRLF
//! ...
//! 0CRLF
//! [trailer fields CRLF]*
//! CRLF
//! ```
//!
//! Extensions and trailer fields are accepted and ignored.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::{ParseError, PayloadItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    /// Size of the current chunk while reading the size line, then the bytes
    /// of it still to be read
    remaining: u64,
    size_digits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    Size,
    SizeLws,
    Extension,
    SizeLf,
    Data,
    DataCr,
    DataLf,
    Trailer,
    TrailerLf,
    EndCr,
    EndLf,
    Done,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: ChunkedState::Size, remaining: 0, size_digits: 0 }
    }

    /// True once the last-chunk and trailer section have been consumed.
    pub fn is_done(&self) -> bool {
        self.state == ChunkedState::Done
    }

    fn step(&mut self, byte: u8) -> Result<ChunkedState, ParseError> {
        use ChunkedState::*;

        let next = match (self.state, byte) {
            (Size, b) if b.is_ascii_hexdigit() => {
                // hex digit, so to_digit can't fail
                let digit = u64::from((b as char).to_digit(16).unwrap_or_default());
                self.remaining = self
                    .remaining
                    .checked_mul(16)
                    .and_then(|size| size.checked_add(digit))
                    .ok_or_else(|| ParseError::invalid_chunk("chunk size overflow"))?;
                self.size_digits += 1;
                Size
            }
            (Size, _) if self.size_digits == 0 => return Err(ParseError::invalid_chunk("missing chunk size")),
            (Size | SizeLws, b' ' | b'\t') => SizeLws,
            (Size | SizeLws, b';') => Extension,
            (Size | SizeLws | Extension, b'\r') => SizeLf,
            (Extension, b'\n') => return Err(ParseError::invalid_chunk("chunk extension contains newline")),
            (Extension, _) => Extension,
            (SizeLf, b'\n') if self.remaining == 0 => EndCr,
            (SizeLf, b'\n') => Data,
            (DataCr, b'\r') => DataLf,
            (DataLf, b'\n') => {
                self.size_digits = 0;
                Size
            }
            (EndCr, b'\r') => EndLf,
            (Trailer, b'\r') => TrailerLf,
            (EndCr | Trailer, _) => Trailer,
            (TrailerLf, b'\n') => EndCr,
            (EndLf, b'\n') => Done,
            (state, b) => return Err(ParseError::invalid_chunk(format!("unexpected byte {b:#04x} in state {state:?}"))),
        };

        Ok(next)
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` for (part of) a chunk's data
    /// - `Ok(Some(PayloadItem::Eof))` once the terminating chunk is read
    /// - `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                ChunkedState::Done => return Ok(Some(PayloadItem::Eof)),

                ChunkedState::Data => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    let len = usize::try_from(self.remaining).unwrap_or(usize::MAX).min(src.len());
                    let bytes = src.split_to(len).freeze();
                    self.remaining -= len as u64;
                    if self.remaining == 0 {
                        self.state = ChunkedState::DataCr;
                    }

                    trace!(len, "read chunked bytes");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                _ => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                    let byte = src.get_u8();
                    self.state = self.step(byte)?;
                }
            }
        }
    }
}
