use std::fmt;
use std::io;

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Which bounded element of a message overflowed its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Method,
    Path,
    Line,
    Host,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineKind::Method => "method",
            LineKind::Path => "path",
            LineKind::Line => "line",
            LineKind::Host => "host header",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{kind} too long, exceed the limit {max_size}")]
    TooLongLine { kind: LineKind, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid request line: {reason}")]
    InvalidRequestLine { reason: String },

    #[error("invalid status line: {reason}")]
    InvalidStatusLine { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid chunked body: {reason}")]
    InvalidChunk { reason: String },

    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_long_line(kind: LineKind, max_size: usize) -> Self {
        Self::TooLongLine { kind, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_request_line<S: ToString>(str: S) -> Self {
        Self::InvalidRequestLine { reason: str.to_string() }
    }

    pub fn invalid_status_line<S: ToString>(str: S) -> Self {
        Self::InvalidStatusLine { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn invalid_chunk<S: ToString>(str: S) -> Self {
        Self::InvalidChunk { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status a server should answer with when a request fails to parse.
    ///
    /// Protocol violations map to the nearest 4xx; only I/O failures are 500.
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::TooLongLine { kind: LineKind::Path, .. } => StatusCode::URI_TOO_LONG,
            ParseError::TooLongLine { .. }
            | ParseError::TooManyHeaders { .. }
            | ParseError::InvalidRequestLine { .. }
            | ParseError::InvalidStatusLine { .. }
            | ParseError::InvalidVersion(_)
            | ParseError::InvalidHeader { .. }
            | ParseError::InvalidContentLength { .. }
            | ParseError::InvalidChunk { .. }
            | ParseError::UnexpectedEof => StatusCode::BAD_REQUEST,
            ParseError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("chunked body already finished")]
    ChunksFinished,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
