//! Bounded line decoder.
//!
//! Splits the input into CRLF (or bare LF) terminated lines. A line longer than
//! the configured limit is rejected as soon as the limit is crossed, so a peer
//! that never sends a line terminator cannot make the buffer grow past
//! `max_length` plus the terminator.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{LineKind, ParseError};

/// Decoder producing one line per frame, terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDecoder {
    kind: LineKind,
    max_length: usize,
    /// Bytes already scanned for a terminator on a previous call
    next_index: usize,
}

impl LineDecoder {
    pub fn new(kind: LineKind, max_length: usize) -> Self {
        Self { kind, max_length, next_index: 0 }
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Decoder for LineDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// Returns the next complete line without its `\r\n` or `\n` terminator.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(line))`: a complete line, possibly empty
    /// - `Ok(None)`: need more data
    /// - `Err(ParseError::TooLongLine)`: the line exceeds `max_length`
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // the terminator is allowed on top of the limit
        let scan_end = src.len().min(self.max_length + 2);

        let newline = src[self.next_index.min(scan_end)..scan_end].iter().position(|b| *b == b'\n');

        match newline {
            Some(offset) => {
                let newline_index = self.next_index.min(scan_end) + offset;
                self.next_index = 0;

                let mut line = src.split_to(newline_index + 1);
                line.truncate(newline_index);
                if line.last() == Some(&b'\r') {
                    line.truncate(newline_index - 1);
                }

                ensure!(line.len() <= self.max_length, ParseError::too_long_line(self.kind, self.max_length));

                trace!(len = line.len(), "decoded line");
                Ok(Some(line.freeze()))
            }
            None => {
                ensure!(src.len() <= self.max_length + 1, ParseError::too_long_line(self.kind, self.max_length));
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None if src.is_empty() => Ok(None),
            // a partial line cut off by the peer closing the stream
            None => Err(ParseError::UnexpectedEof),
        }
    }
}
