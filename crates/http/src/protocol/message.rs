use bytes::{Buf, Bytes};

/// One frame of a body, as produced by the body decoders and consumed by the
/// chunked encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    Chunk(Data),
    /// No more body follows
    Eof,
}

impl<D: Buf> PayloadItem<D> {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Bytes carried by this frame, 0 for [`PayloadItem::Eof`].
    pub fn len(&self) -> usize {
        match self {
            PayloadItem::Chunk(data) => data.remaining(),
            PayloadItem::Eof => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The frame's data, `None` at the end of the body.
    pub fn into_bytes(self) -> Option<D> {
        match self {
            PayloadItem::Chunk(data) => Some(data),
            PayloadItem::Eof => None,
        }
    }
}

/// Result of moving a body between a source and a sink.
///
/// `Eof` means the data ran out before the declared length was reached. It is
/// not an I/O failure: those are reported through the error type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// All requested bytes were transferred
    Complete(u64),
    /// The source was exhausted early after this many bytes
    Eof(u64),
}

impl Transfer {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, Transfer::Complete(_))
    }

    /// Number of bytes actually transferred
    #[inline]
    pub fn transferred(&self) -> u64 {
        match self {
            Transfer::Complete(n) | Transfer::Eof(n) => *n,
        }
    }
}

/// Outcome of a single raw body read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RawRead {
    /// This many bytes were placed at the start of the caller's buffer
    Data(usize),
    /// The peer closed the stream
    Eof,
}

impl RawRead {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, RawRead::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_len() {
        assert_eq!(PayloadItem::Chunk(Bytes::from_static(b"abc")).len(), 3);
        assert!(PayloadItem::<Bytes>::Eof.is_empty());
        assert_eq!(PayloadItem::<Bytes>::Eof.into_bytes(), None);
    }

    #[test]
    fn transferred_counts_both_outcomes() {
        assert_eq!(Transfer::Complete(10).transferred(), 10);
        assert_eq!(Transfer::Eof(4).transferred(), 4);
        assert!(!Transfer::Eof(4).is_complete());
    }
}
