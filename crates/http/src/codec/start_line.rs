//! Request and status line parsing.
//!
//! Lines arrive from [`LineDecoder`](super::LineDecoder) already bounded and
//! stripped of their terminator. Parsing is delegated to `httparse`, which
//! validates the method token, the request target and the version; the lengths
//! of method and path are then checked against their own limits.

use bytes::BytesMut;
use http::{Method, StatusCode, Version};
use httparse::Status;

use crate::ensure;
use crate::protocol::{HTTP_METHOD_MAX, HTTP_PATH_MAX, LineKind, ParseError, RequestLine, StatusLine};

/// httparse wants a whole message head; an empty header section completes it
const EMPTY_HEAD_END: &[u8] = b"\r\n\r\n";

/// Parses `METHOD SP PATH SP HTTP/1.x`.
pub fn parse_request_line(line: &[u8]) -> Result<RequestLine, ParseError> {
    let head = terminated(line);

    let mut req = httparse::Request::new(&mut []);
    match req.parse(&head) {
        Ok(Status::Complete(_)) => {}
        Ok(Status::Partial) => return Err(ParseError::invalid_request_line("incomplete request line")),
        Err(e) => return Err(ParseError::invalid_request_line(e)),
    }

    let method = req.method.ok_or_else(|| ParseError::invalid_request_line("missing method"))?;
    ensure!(method.len() <= HTTP_METHOD_MAX, ParseError::too_long_line(LineKind::Method, HTTP_METHOD_MAX));

    let path = req.path.ok_or_else(|| ParseError::invalid_request_line("missing path"))?;
    ensure!(path.len() <= HTTP_PATH_MAX, ParseError::too_long_line(LineKind::Path, HTTP_PATH_MAX));

    let method = Method::from_bytes(method.as_bytes()).map_err(ParseError::invalid_request_line)?;
    let version = version_from(req.version)?;

    Ok(RequestLine::new(method, path, version))
}

/// Parses `HTTP/1.x SP STATUS SP REASON`.
pub fn parse_status_line(line: &[u8]) -> Result<StatusLine, ParseError> {
    let head = terminated(line);

    let mut resp = httparse::Response::new(&mut []);
    match resp.parse(&head) {
        Ok(Status::Complete(_)) => {}
        Ok(Status::Partial) => return Err(ParseError::invalid_status_line("incomplete status line")),
        Err(e) => return Err(ParseError::invalid_status_line(e)),
    }

    let code = resp.code.ok_or_else(|| ParseError::invalid_status_line("missing status code"))?;
    let status = StatusCode::from_u16(code).map_err(ParseError::invalid_status_line)?;
    let version = version_from(resp.version)?;

    Ok(StatusLine::new(version, status, resp.reason.unwrap_or_default()))
}

fn terminated(line: &[u8]) -> BytesMut {
    let mut head = BytesMut::with_capacity(line.len() + EMPTY_HEAD_END.len());
    head.extend_from_slice(line);
    head.extend_from_slice(EMPTY_HEAD_END);
    head
}

fn version_from(version: Option<u8>) -> Result<Version, ParseError> {
    match version {
        Some(0) => Ok(Version::HTTP_10),
        Some(1) => Ok(Version::HTTP_11),
        // http2 and http3 are not spoken here
        v => Err(ParseError::InvalidVersion(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_line() {
        let request_line = parse_request_line(b"GET /index.html HTTP/1.1").unwrap();

        assert_eq!(request_line.method(), &Method::GET);
        assert_eq!(request_line.path(), "/index.html");
        assert_eq!(request_line.version(), Version::HTTP_11);
    }

    #[test]
    fn request_line_keeps_query() {
        let request_line = parse_request_line(b"POST /upload?name=a.txt HTTP/1.0").unwrap();

        assert_eq!(request_line.method(), &Method::POST);
        assert_eq!(request_line.path(), "/upload?name=a.txt");
        assert_eq!(request_line.version(), Version::HTTP_10);
    }

    #[test]
    fn request_line_extension_method() {
        let request_line = parse_request_line(b"PROPFIND / HTTP/1.1").unwrap();
        assert_eq!(request_line.method().as_str(), "PROPFIND");
    }

    #[test]
    fn request_line_method_too_long() {
        let line = format!("{} / HTTP/1.1", "A".repeat(HTTP_METHOD_MAX + 1));
        assert!(matches!(
            parse_request_line(line.as_bytes()),
            Err(ParseError::TooLongLine { kind: LineKind::Method, .. })
        ));
    }

    #[test]
    fn request_line_malformed() {
        assert!(matches!(parse_request_line(b"GET"), Err(ParseError::InvalidRequestLine { .. })));
        assert!(matches!(parse_request_line(b"GET /"), Err(ParseError::InvalidRequestLine { .. })));
        assert!(matches!(parse_request_line(b"GET / FTP/1.1"), Err(ParseError::InvalidRequestLine { .. })));
        assert!(matches!(parse_request_line(b""), Err(ParseError::InvalidRequestLine { .. })));
    }

    #[test]
    fn status_line() {
        let status_line = parse_status_line(b"HTTP/1.1 301 Found").unwrap();

        assert_eq!(status_line.version(), Version::HTTP_11);
        assert_eq!(status_line.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(status_line.reason(), "Found");
    }

    #[test]
    fn status_line_malformed() {
        assert!(matches!(parse_status_line(b"HTTP/1.1 abc OK"), Err(ParseError::InvalidStatusLine { .. })));
        assert!(matches!(parse_status_line(b"hello"), Err(ParseError::InvalidStatusLine { .. })));
    }
}
