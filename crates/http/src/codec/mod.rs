//! HTTP/1.x message codec.
//!
//! Reading is line oriented until the end of the message head, then switches
//! to the body framing the head announced:
//!
//! - [`LineDecoder`]: bounded CRLF/LF terminated lines
//! - [`parse_request_line`] / [`parse_status_line`]: start lines
//! - [`decode_header_line`]: one header line, folding reported explicitly
//! - [`MessageDecoder`]: switches between line, length and chunked framing
//!
//! Writing mirrors it:
//!
//! - [`HeaderEncoder`]: start line, header lines and end of head
//! - [`MessageEncoder`]: raw or chunked body bytes
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use hearth_http::codec::{Inbound, MessageDecoder};
//! use hearth_http::protocol::LineKind;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = MessageDecoder::new(LineKind::Path, 1024);
//! let mut buffer = BytesMut::from("GET / HTTP/1.1\r\n");
//! let line = decoder.decode(&mut buffer).unwrap();
//! assert!(matches!(line, Some(Inbound::Line(_))));
//! ```

mod body;
mod header;
mod line_decoder;
mod message_decoder;
mod message_encoder;
mod start_line;

pub use body::{ChunkedDecoder, ChunkedEncoder, LengthDecoder};
pub use header::{Head, HeaderEncoder, decode_header_line};
pub use line_decoder::LineDecoder;
pub use message_decoder::{Inbound, MessageDecoder};
pub use message_encoder::{MessageEncoder, Outbound};
pub use start_line::{parse_request_line, parse_status_line};
