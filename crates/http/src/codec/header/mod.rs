//! HTTP header processing for both directions.
//!
//! - [`decode_header_line`]: decodes one header line, reporting folded
//!   continuations explicitly
//! - [`HeaderEncoder`]: encodes start lines, header lines and the end of the
//!   header section

mod header_decoder;
mod header_encoder;

pub use header_decoder::decode_header_line;
pub use header_encoder::Head;
pub use header_encoder::HeaderEncoder;
