//! HTTP message head encoder.
//!
//! Serializes the head of a message into raw bytes: a request or response
//! line, individual header lines and the blank line ending the header section.
//! Ordering between those parts is the caller's responsibility; the encoder
//! writes whatever it is given.
//!
//! Header values are written verbatim. Callers must produce valid syntax.

use std::io;
use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};
use http::{HeaderName, Method, StatusCode, Version};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::SendError;

/// One element of a message head.
#[derive(Debug, Clone, Copy)]
pub enum Head<'a> {
    RequestLine { method: &'a Method, path: &'a str, version: Version },
    StatusLine { version: Version, status: StatusCode, reason: &'a str },
    Header { name: &'a str, value: &'a str },
    EndHeaders,
}

/// Encoder for message heads implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<Head<'_>> for HeaderEncoder {
    type Error = SendError;

    /// Encodes one head element into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - HTTP version is not HTTP/1.0 or HTTP/1.1
    /// - A header name is not a valid token
    fn encode(&mut self, item: Head<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Head::RequestLine { method, path, version } => {
                let version = version_str(version)?;
                write!(FastWrite(dst), "{method} {path} {version}\r\n")?;
            }
            Head::StatusLine { version, status, reason } => {
                let version = version_str(version)?;
                write!(FastWrite(dst), "{version} {} {reason}\r\n", status.as_str())?;
            }
            Head::Header { name, value } => {
                if HeaderName::from_bytes(name.as_bytes()).is_err() {
                    return Err(SendError::invalid_header(format!("invalid header name {name:?}")));
                }
                dst.reserve(name.len() + value.len() + 4);
                dst.put_slice(name.as_bytes());
                dst.put_slice(b": ");
                dst.put_slice(value.as_bytes());
                dst.put_slice(b"\r\n");
            }
            Head::EndHeaders => dst.put_slice(b"\r\n"),
        }
        Ok(())
    }
}

fn version_str(version: Version) -> Result<&'static str, SendError> {
    match version {
        Version::HTTP_10 => Ok("HTTP/1.0"),
        Version::HTTP_11 => Ok("HTTP/1.1"),
        v => {
            error!(http_version = ?v, "unsupported http version");
            Err(io::Error::from(ErrorKind::Unsupported).into())
        }
    }
}

/// Writer adapter so `write!` can format straight into a `BytesMut`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(items: &[Head<'_>]) -> BytesMut {
        let mut dst = BytesMut::new();
        for item in items {
            HeaderEncoder.encode(*item, &mut dst).unwrap();
        }
        dst
    }

    #[test]
    fn response_head() {
        let dst = encode_all(&[
            Head::StatusLine { version: Version::HTTP_11, status: StatusCode::NOT_FOUND, reason: "Not Found" },
            Head::Header { name: "Content-Length", value: "0" },
            Head::EndHeaders,
        ]);

        assert_eq!(&dst[..], b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    }

    #[test]
    fn request_head_without_headers() {
        let dst = encode_all(&[
            Head::RequestLine { method: &Method::GET, path: "/a/b?c=d", version: Version::HTTP_10 },
            Head::EndHeaders,
        ]);

        assert_eq!(&dst[..], b"GET /a/b?c=d HTTP/1.0\r\n\r\n");
    }

    #[test]
    fn unsupported_version() {
        let mut dst = BytesMut::new();
        let result = HeaderEncoder.encode(
            Head::StatusLine { version: Version::HTTP_2, status: StatusCode::OK, reason: "OK" },
            &mut dst,
        );
        assert!(matches!(result, Err(SendError::Io { .. })));
    }

    #[test]
    fn invalid_header_name() {
        let mut dst = BytesMut::new();
        let result = HeaderEncoder.encode(Head::Header { name: "Bad Name", value: "x" }, &mut dst);
        assert!(matches!(result, Err(SendError::InvalidHeader { .. })));
        assert!(dst.is_empty());
    }
}
