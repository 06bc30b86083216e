use std::fmt;

use http::{StatusCode, Version};

/// The parsed `HTTP/1.x SP STATUS SP REASON` line of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    version: Version,
    status: StatusCode,
    reason: String,
}

impl StatusLine {
    pub fn new(version: Version, status: StatusCode, reason: impl Into<String>) -> Self {
        Self { version, status, reason: reason.into() }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The reason phrase exactly as it appeared on the wire.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} {}", self.version, self.status.as_str(), self.reason)
    }
}

/// Default reason phrase for a status code.
///
/// The codes this engine emits itself have fixed phrases (note that 301 reads
/// `Found`); anything else falls back to the canonical phrase from `http`.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200 => "OK",
        201 => "Created",
        301 => "Found",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        411 => "Length Required",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        500 => "Internal Server Error",
        _ => status.canonical_reason().unwrap_or("Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_reason_phrases() {
        assert_eq!(reason_phrase(StatusCode::OK), "OK");
        assert_eq!(reason_phrase(StatusCode::MOVED_PERMANENTLY), "Found");
        assert_eq!(reason_phrase(StatusCode::PAYLOAD_TOO_LARGE), "Request Entity Too Large");
        assert_eq!(reason_phrase(StatusCode::URI_TOO_LONG), "Request-URI Too Long");
    }

    #[test]
    fn fallback_reason_phrases() {
        assert_eq!(reason_phrase(StatusCode::IM_A_TEAPOT), "I'm a teapot");
        assert_eq!(reason_phrase(StatusCode::from_u16(599).unwrap()), "Unknown");
    }
}
