//! One HTTP/1.x exchange over a pair of byte streams.
//!
//! - [`HttpStream`]: reads and writes message heads and bodies, pull based,
//!   one operation at a time
//! - [`MessageWriter`]: the buffered write half behind it

mod http_stream;
mod message_writer;

pub use http_stream::BodySink;
pub use http_stream::HttpStream;
pub use message_writer::MessageWriter;
