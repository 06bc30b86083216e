//! Mode-switching decoder for one HTTP message stream.
//!
//! The head of a message is read line by line, its body with whichever framing
//! the headers announced. [`HttpStream`](crate::connection::HttpStream) keeps a
//! single `FramedRead` over the connection and switches the decoder's mode
//! between reads, so bytes buffered past the head are never lost.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::LineDecoder;
use crate::codec::body::{ChunkedDecoder, LengthDecoder};
use crate::protocol::{LineKind, ParseError, PayloadItem};

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A start line or header line, terminator stripped
    Line(Bytes),
    Payload(PayloadItem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Line(LineDecoder),
    Length(LengthDecoder),
    Chunked(ChunkedDecoder),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDecoder {
    mode: Mode,
}

impl MessageDecoder {
    pub fn new(kind: LineKind, max_length: usize) -> Self {
        Self { mode: Mode::Line(LineDecoder::new(kind, max_length)) }
    }

    /// Next frames are lines of at most `max_length` bytes.
    pub fn expect_line(&mut self, kind: LineKind, max_length: usize) {
        match &self.mode {
            // keep the scan offset of a partially buffered line
            Mode::Line(decoder) if decoder.kind() == kind && decoder.max_length() == max_length => {}
            _ => self.mode = Mode::Line(LineDecoder::new(kind, max_length)),
        }
    }

    /// Next frames are a body of exactly `length` bytes.
    pub fn expect_length(&mut self, length: u64) {
        trace!(length, "switch to length delimited body");
        self.mode = Mode::Length(LengthDecoder::new(length));
    }

    /// Next frames are a chunked body.
    pub fn expect_chunked(&mut self) {
        trace!("switch to chunked body");
        self.mode = Mode::Chunked(ChunkedDecoder::new());
    }
}

impl Decoder for MessageDecoder {
    type Item = Inbound;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.mode {
            Mode::Line(decoder) => Ok(decoder.decode(src)?.map(Inbound::Line)),
            Mode::Length(decoder) => Ok(decoder.decode(src)?.map(Inbound::Payload)),
            Mode::Chunked(decoder) => Ok(decoder.decode(src)?.map(Inbound::Payload)),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.mode {
            Mode::Line(decoder) => Ok(decoder.decode_eof(src)?.map(Inbound::Line)),
            // a short body is reported by the caller as an early end
            Mode::Length(decoder) => Ok(decoder.decode(src)?.map(Inbound::Payload)),
            Mode::Chunked(decoder) => match decoder.decode(src)? {
                Some(item) => Ok(Some(Inbound::Payload(item))),
                None => Err(ParseError::UnexpectedEof),
            },
        }
    }
}
