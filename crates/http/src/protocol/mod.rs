//! Core HTTP/1.x protocol types.
//!
//! This module holds the values that flow between the codec and its users:
//!
//! - **Start lines**: [`RequestLine`] and [`StatusLine`], plus the default
//!   [`reason_phrase`] table used when writing a response line
//! - **Headers**: [`HeaderField`] and [`HeaderItem`], one header line per read
//! - **Bodies**: [`PayloadItem`] produced by the body decoders, [`Transfer`]
//!   and [`RawRead`] reporting how much of a body moved
//! - **Errors**: [`ParseError`] for the read side, [`SendError`] for the write
//!   side, [`HttpError`] combining both
//!
//! # Limits
//!
//! Every line read from a peer is bounded. The limits below cap the memory a
//! hostile peer can make a connection buffer; overflowing one is a
//! [`ParseError::TooLongLine`], never a silent truncation.

mod message;
pub use message::PayloadItem;
pub use message::RawRead;
pub use message::Transfer;

mod request;
pub use request::RequestLine;

mod response;
pub use response::StatusLine;
pub use response::reason_phrase;

mod header;
pub use header::HeaderField;
pub use header::HeaderItem;
pub use header::append_field;

mod error;
pub use error::HttpError;
pub use error::LineKind;
pub use error::ParseError;
pub use error::SendError;

/// Maximum length of any single line (start line or header line)
pub const HTTP_LINE: usize = 1024;

/// Maximum length of a request method
pub const HTTP_METHOD_MAX: usize = 64;

/// Maximum length of a request path
pub const HTTP_PATH_MAX: usize = 1024;

/// Maximum length of the `Host` header value
pub const HTTP_HOST_MAX: usize = 256;

/// Maximum number of header lines collected into one header map
pub const HTTP_HEADERS_MAX: usize = 64;
