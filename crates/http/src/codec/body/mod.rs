//! HTTP body framing.
//!
//! ## Decoders
//! - [`ChunkedDecoder`]: `Transfer-Encoding: chunked` payloads
//! - [`LengthDecoder`]: Content-Length delimited payloads
//!
//! ## Encoders
//! - [`ChunkedEncoder`]: `Transfer-Encoding: chunked` framing
//!
//! Unframed body bytes (Content-Length or close-delimited) need no encoder
//! and are written as they are.

mod chunked_decoder;
mod chunked_encoder;
mod length_decoder;

pub use chunked_decoder::ChunkedDecoder;
pub use chunked_encoder::ChunkedEncoder;
pub use length_decoder::LengthDecoder;
