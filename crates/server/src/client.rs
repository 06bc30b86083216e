use std::collections::VecDeque;
use std::fmt;

use hearth_http::connection::{BodySink, HttpStream};
use hearth_http::protocol::{HTTP_HEADERS_MAX, HeaderField, HeaderItem, ParseError, Transfer, append_field};
use http::{HeaderMap, Method, StatusCode, Version, header};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::ServerError;

/// The connection type every handler works on.
pub type Connection = HttpStream<Box<dyn AsyncRead + Send + Unpin>, Box<dyn AsyncWrite + Send + Unpin>>;

/// Progress of the response, only ever moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResponseState {
    NoStatus,
    StatusSent,
    HeadersSent,
    BodySent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyMode {
    None,
    /// Content-Length framed
    Fixed,
    Chunked,
    /// Unframed, delimited by closing the connection
    Close,
}

/// One request/response exchange as seen by a handler.
///
/// The request head is read before dispatch; its header lines are then handed
/// out one at a time through [`request_header`](Self::request_header). The
/// response is written strictly as status, headers, body. Any call out of that
/// order fails with [`ServerError::Invariant`] and writes nothing.
pub struct ServerClient {
    stream: Connection,

    method: Method,
    path: String,
    version: Version,
    content_length: u64,
    headers: VecDeque<HeaderField>,

    status: Option<StatusCode>,
    state: ResponseState,
    body: BodyMode,
}

impl ServerClient {
    pub fn new(stream: Connection) -> Self {
        Self {
            stream,
            method: Method::GET,
            path: String::new(),
            version: Version::HTTP_11,
            content_length: 0,
            headers: VecDeque::new(),
            status: None,
            state: ResponseState::NoStatus,
            body: BodyMode::None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Declared request body length, 0 when no `Content-Length` was sent.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn response_state(&self) -> ResponseState {
        self.state
    }

    /// The status sent so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Reads the request line and header section.
    pub(crate) async fn read_request(&mut self) -> Result<(), ServerError> {
        let request_line = self.stream.read_request().await?;
        info!(method = %request_line.method(), path = request_line.path(), version = ?request_line.version(), "request");

        let (method, path, version) = request_line.into_parts();
        self.method = method;
        self.path = path;
        self.version = version;

        loop {
            let HeaderItem::Field(field) = self.stream.read_header().await? else {
                break;
            };

            if self.headers.len() >= HTTP_HEADERS_MAX {
                return Err(ParseError::too_many_headers(HTTP_HEADERS_MAX).into());
            }

            debug!(name = %field.name(), value = ?field.value(), "request header");
            if !field.is_folded() && *field.name() == header::CONTENT_LENGTH {
                self.content_length = parse_content_length(field.value().as_bytes())?;
                debug!(content_length = self.content_length, "request body length");
            }

            self.headers.push_back(field);
        }

        Ok(())
    }

    /// Next request header, or [`HeaderItem::End`] once all have been taken.
    pub fn request_header(&mut self) -> HeaderItem {
        self.headers.pop_front().map_or(HeaderItem::End, HeaderItem::Field)
    }

    /// Skips the remaining request headers.
    pub fn drain_request_headers(&mut self) {
        self.headers.clear();
    }

    /// Takes the remaining request headers as a map, folded lines joined.
    pub fn request_headers(&mut self) -> Result<HeaderMap, ServerError> {
        let mut headers = HeaderMap::new();
        for field in self.headers.drain(..) {
            append_field(&mut headers, field)?;
        }
        Ok(headers)
    }

    /// Reads the request body of the declared length into `sink`.
    ///
    /// # Errors
    ///
    /// [`ServerError::LengthRequired`] when the request carried no
    /// `Content-Length`.
    pub async fn request_body(&mut self, sink: Option<BodySink<'_>>) -> Result<Transfer, ServerError> {
        if self.content_length == 0 {
            debug!("no request body given");
            return Err(ServerError::LengthRequired);
        }

        let transfer = self.stream.read_body(sink, Some(self.content_length)).await?;
        if !transfer.is_complete() {
            warn!(read = transfer.transferred(), content_length = self.content_length, "request body truncated");
        }
        Ok(transfer)
    }

    /// Sends the status line. `reason` defaults to the standard phrase.
    pub fn response(&mut self, status: StatusCode, reason: Option<&str>) -> Result<(), ServerError> {
        if let Some(sent) = self.status {
            error!(status = status.as_u16(), sent = sent.as_u16(), "attempting to re-send status");
            return Err(ServerError::invariant(format!("status {sent} already sent")));
        }

        info!(status = status.as_u16(), reason, "response");
        self.status = Some(status);
        self.state = ResponseState::StatusSent;
        self.stream.write_response(self.version, status, reason)?;
        Ok(())
    }

    /// Sends one response header.
    pub fn response_header(&mut self, name: &str, value: impl fmt::Display) -> Result<(), ServerError> {
        self.expect_state(ResponseState::StatusSent, "send header")?;

        info!(name, value = %value, "response header");
        self.stream.write_header(name, value)?;
        Ok(())
    }

    /// Ends the response headers.
    pub fn response_headers(&mut self) -> Result<(), ServerError> {
        self.expect_state(ResponseState::StatusSent, "end headers")?;

        self.state = ResponseState::HeadersSent;
        self.stream.end_headers()?;
        Ok(())
    }

    /// Sends `Content-Length`, ends the headers and streams exactly
    /// `content_length` bytes of `source` as the body.
    pub async fn response_file<S>(&mut self, content_length: u64, source: &mut S) -> Result<Transfer, ServerError>
    where
        S: AsyncRead + Unpin + ?Sized,
    {
        self.response_header("Content-Length", content_length)?;
        self.response_headers()?;

        self.state = ResponseState::BodySent;
        self.body = BodyMode::Fixed;

        let transfer = self.stream.write_from(source, content_length).await?;
        if !transfer.is_complete() {
            warn!(written = transfer.transferred(), content_length, "response body source ended early");
        }
        Ok(transfer)
    }

    /// Appends formatted text to a streamed response body.
    ///
    /// The first call right after the status ends the headers. HTTP/1.1
    /// requests get a chunked body, one chunk per call; HTTP/1.0 requests an
    /// unframed body that ends when the connection closes. Output is buffered
    /// and sent on the next flush or when the exchange finishes.
    pub fn response_print(&mut self, args: fmt::Arguments<'_>) -> Result<(), ServerError> {
        match (self.state, self.body) {
            (ResponseState::NoStatus, _) => {
                error!("attempting to send body without status");
                return Err(ServerError::invariant("body without status"));
            }
            (ResponseState::StatusSent, _) => {
                if self.version == Version::HTTP_11 {
                    self.response_header("Transfer-Encoding", "chunked")?;
                    self.body = BodyMode::Chunked;
                } else {
                    self.body = BodyMode::Close;
                }
                self.response_headers()?;
            }
            // headers were ended without framing, only closing can delimit
            (ResponseState::HeadersSent, _) => self.body = BodyMode::Close,
            (ResponseState::BodySent, BodyMode::Chunked | BodyMode::Close) => {}
            (ResponseState::BodySent, BodyMode::Fixed | BodyMode::None) => {
                error!("attempting to re-send body");
                return Err(ServerError::invariant("body already sent"));
            }
        }

        self.state = ResponseState::BodySent;
        match self.body {
            BodyMode::Chunked => self.stream.print_chunk(args)?,
            _ => self.stream.write_fmt(args)?,
        }
        Ok(())
    }

    /// Answers with a 301 pointing at `location`, without a body.
    pub fn response_redirect(&mut self, location: impl fmt::Display) -> Result<(), ServerError> {
        self.response(StatusCode::MOVED_PERMANENTLY, None)?;
        self.response_header("Location", location)?;
        self.response_headers()
    }

    /// Sends whatever the response has buffered so far.
    pub async fn flush(&mut self) -> Result<(), ServerError> {
        Ok(self.stream.flush().await?)
    }

    /// Completes the exchange: ends a pending chunked body, flushes and shuts
    /// down the write half. Failures are logged, the connection is done
    /// either way.
    pub(crate) async fn finish(&mut self) {
        if self.body == BodyMode::Chunked
            && !self.stream.chunks_finished()
            && let Err(e) = self.stream.finish_chunks().await
        {
            error!(cause = %e, "failed to finish chunked response body");
        }

        if let Err(e) = self.stream.shutdown().await {
            warn!(cause = %e, "failed to shutdown connection");
        }
    }

    fn expect_state(&self, expected: ResponseState, action: &str) -> Result<(), ServerError> {
        if self.state == expected {
            return Ok(());
        }

        let reason = match self.state {
            ResponseState::NoStatus => format!("{action} without status"),
            _ => format!("{action} after headers were ended"),
        };
        error!(state = ?self.state, "attempting to {reason}");
        Err(ServerError::invariant(reason))
    }
}

impl fmt::Debug for ServerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerClient")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("version", &self.version)
            .field("content_length", &self.content_length)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn parse_content_length(value: &[u8]) -> Result<u64, ParseError> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| ParseError::invalid_content_length(String::from_utf8_lossy(value)))
}
