use std::error::Error;
use std::io;

use hearth_http::protocol::{HttpError, ParseError, SendError};
use http::StatusCode;
use thiserror::Error;

/// Error type handlers return. Anything a handler fails with ends as a
/// 500, unless it is a [`ServerError`] that knows a better status.
pub type HandlerError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("http error: {source}")]
    Http {
        #[from]
        source: HttpError,
    },

    /// A response phase was emitted twice or out of order
    #[error("response invariant violated: {reason}")]
    Invariant { reason: String },

    #[error("request body without content length")]
    LengthRequired,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ServerError {
    pub fn invariant<S: ToString>(str: S) -> Self {
        Self::Invariant { reason: str.to_string() }
    }

    /// Status to answer with when this error ends a request.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Http { source: HttpError::RequestError { source } } => source.status(),
            ServerError::LengthRequired => StatusCode::LENGTH_REQUIRED,
            ServerError::Http { .. } | ServerError::Invariant { .. } | ServerError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, ServerError::Invariant { .. })
    }
}

impl From<ParseError> for ServerError {
    fn from(e: ParseError) -> Self {
        Self::Http { source: e.into() }
    }
}

impl From<SendError> for ServerError {
    fn from(e: SendError) -> Self {
        Self::Http { source: e.into() }
    }
}
