use std::fmt;

use bytes::Buf;
use futures::StreamExt;
use http::{HeaderMap, HeaderName, Method, StatusCode, Version};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::FramedRead;
use tracing::{debug, trace};

use crate::codec::{Head, Inbound, MessageDecoder, Outbound, decode_header_line, parse_request_line, parse_status_line};
use crate::connection::MessageWriter;
use crate::ensure;
use crate::protocol::{
    HTTP_HEADERS_MAX, HTTP_LINE, HeaderItem, LineKind, ParseError, PayloadItem, RawRead, RequestLine, SendError, StatusLine,
    Transfer, append_field, reason_phrase,
};

const BUFFER_SIZE: usize = 8 * 1024;

/// Destination for a body being read; `None` discards it.
pub type BodySink<'a> = &'a mut (dyn AsyncWrite + Send + Unpin);

/// Reader and writer for a single HTTP/1.x exchange.
///
/// Both halves are buffered: reads may pull bytes past the current message
/// element into the read buffer, where the next read finds them, and writes
/// collect in the write buffer until [`flush`](Self::flush),
/// [`shutdown`](Self::shutdown) or enough body has piled up.
///
/// Head writes (`write_request`, `write_response`, `write_header`,
/// `end_headers`) only format into the write buffer and are therefore
/// synchronous. Ordering of the parts is left to the caller.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpStream<R, W> {
    framed_read: FramedRead<R, MessageDecoder>,
    writer: MessageWriter<W>,
    /// Name of the last header read, for folded continuation lines
    last_header: Option<HeaderName>,
}

impl<R, W> HttpStream<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, MessageDecoder::new(LineKind::Path, HTTP_LINE), BUFFER_SIZE),
            writer: MessageWriter::with_capacity(writer, BUFFER_SIZE),
            last_header: None,
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.framed_read.into_inner(), self.writer.into_inner())
    }

    // ---- write side ----

    /// Writes `METHOD SP PATH SP HTTP/1.x CRLF`.
    pub fn write_request(&mut self, method: &Method, path: &str, version: Version) -> Result<(), SendError> {
        self.writer.write_head(Head::RequestLine { method, path, version })
    }

    /// Writes `HTTP/1.x SP STATUS SP REASON CRLF`, with the default reason
    /// phrase for `status` when `reason` is `None`.
    pub fn write_response(&mut self, version: Version, status: StatusCode, reason: Option<&str>) -> Result<(), SendError> {
        let reason = reason.unwrap_or_else(|| reason_phrase(status));
        self.writer.write_head(Head::StatusLine { version, status, reason })
    }

    /// Writes one `Name: value` line. The value is written as formatted, so
    /// callers must not produce line breaks in it.
    pub fn write_header(&mut self, name: &str, value: impl fmt::Display) -> Result<(), SendError> {
        let value = value.to_string();
        self.writer.write_head(Head::Header { name, value: &value })
    }

    /// Terminates the header section, even when no header was written.
    pub fn end_headers(&mut self) -> Result<(), SendError> {
        self.writer.write_head(Head::EndHeaders)
    }

    /// Writes unframed body bytes.
    pub async fn write_body(&mut self, data: &[u8]) -> Result<(), SendError> {
        self.writer.write_body(Outbound::Data(data))?;
        self.writer.flush_if_full().await
    }

    /// Formats unframed body bytes into the write buffer.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), SendError> {
        let text = fmt::format(args);
        self.writer.write_body(Outbound::Data(text.as_bytes()))
    }

    /// Writes one chunk of a chunked body. An empty `data` writes nothing.
    ///
    /// # Errors
    ///
    /// [`SendError::ChunksFinished`] after [`finish_chunks`](Self::finish_chunks).
    pub async fn write_chunk(&mut self, data: &[u8]) -> Result<(), SendError> {
        self.writer.write_body(Outbound::Chunk(data))?;
        self.writer.flush_if_full().await
    }

    /// Formats one chunk of a chunked body into the write buffer.
    pub fn print_chunk(&mut self, args: fmt::Arguments<'_>) -> Result<(), SendError> {
        let text = fmt::format(args);
        self.writer.write_body(Outbound::Chunk(text.as_bytes()))
    }

    /// Writes the last-chunk and the empty trailer, then flushes.
    pub async fn finish_chunks(&mut self) -> Result<(), SendError> {
        self.writer.write_body(Outbound::LastChunk)?;
        self.writer.flush().await
    }

    pub fn chunks_finished(&self) -> bool {
        self.writer.chunks_finished()
    }

    /// Copies exactly `content_length` bytes from `source` as unframed body.
    ///
    /// Returns [`Transfer::Eof`] when `source` runs out first; whatever was
    /// read up to then has been written.
    pub async fn write_from<S>(&mut self, source: &mut S, content_length: u64) -> Result<Transfer, SendError>
    where
        S: AsyncRead + Unpin + ?Sized,
    {
        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut written = 0u64;

        while written < content_length {
            let want = usize::try_from(content_length - written).unwrap_or(usize::MAX).min(buf.len());
            let n = source.read(&mut buf[..want]).await?;
            if n == 0 {
                debug!(written, content_length, "body source exhausted early");
                return Ok(Transfer::Eof(written));
            }

            self.write_body(&buf[..n]).await?;
            written += n as u64;
        }

        Ok(Transfer::Complete(written))
    }

    pub async fn flush(&mut self) -> Result<(), SendError> {
        self.writer.flush().await
    }

    /// Flushes and shuts down the write half.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.writer.shutdown().await
    }

    // ---- read side ----

    /// Reads and parses a request line.
    pub async fn read_request(&mut self) -> Result<RequestLine, ParseError> {
        // the target is the only unbounded part of a request line
        self.framed_read.decoder_mut().expect_line(LineKind::Path, HTTP_LINE);
        let line = self.read_line().await?;
        self.start_headers();

        let request_line = parse_request_line(&line)?;
        debug!(%request_line, "read request line");
        Ok(request_line)
    }

    /// Reads and parses a status line.
    pub async fn read_response(&mut self) -> Result<StatusLine, ParseError> {
        self.framed_read.decoder_mut().expect_line(LineKind::Line, HTTP_LINE);
        let line = self.read_line().await?;
        self.start_headers();

        let status_line = parse_status_line(&line)?;
        debug!(%status_line, "read status line");
        Ok(status_line)
    }

    /// Reads one header line, or the end of the header section.
    pub async fn read_header(&mut self) -> Result<HeaderItem, ParseError> {
        let line = self.read_line().await?;
        if line.is_empty() {
            self.last_header = None;
            return Ok(HeaderItem::End);
        }

        let field = decode_header_line(&line, self.last_header.as_ref())?;
        trace!(name = %field.name(), folded = field.is_folded(), "read header");
        self.last_header = Some(field.name().clone());
        Ok(HeaderItem::Field(field))
    }

    /// Reads the remaining header section into a map.
    ///
    /// Folded continuation lines are appended to the value they continue,
    /// separated by a single space.
    pub async fn read_headers(&mut self) -> Result<HeaderMap, ParseError> {
        let mut headers = HeaderMap::new();
        let mut lines = 0usize;

        while let HeaderItem::Field(field) = self.read_header().await? {
            lines += 1;
            ensure!(lines <= HTTP_HEADERS_MAX, ParseError::too_many_headers(HTTP_HEADERS_MAX));

            append_field(&mut headers, field)?;
        }

        Ok(headers)
    }

    /// Reads raw body bytes into `buf`, serving already buffered bytes first.
    pub async fn read_raw(&mut self, buf: &mut [u8]) -> Result<RawRead, ParseError> {
        if buf.is_empty() {
            return Ok(RawRead::Data(0));
        }

        let buffered = self.framed_read.read_buffer_mut();
        if !buffered.is_empty() {
            let n = buffered.len().min(buf.len());
            buf[..n].copy_from_slice(&buffered[..n]);
            buffered.advance(n);
            return Ok(RawRead::Data(n));
        }

        match self.framed_read.get_mut().read(buf).await? {
            0 => Ok(RawRead::Eof),
            n => Ok(RawRead::Data(n)),
        }
    }

    /// Reads an unframed body into `sink`, or discards it when `sink` is
    /// `None`.
    ///
    /// With a `content_length` exactly that many bytes are consumed, otherwise
    /// everything up to the end of the stream. A stream ending before the
    /// declared length is [`Transfer::Eof`], not an error.
    pub async fn read_body(&mut self, mut sink: Option<BodySink<'_>>, content_length: Option<u64>) -> Result<Transfer, ParseError> {
        let Some(content_length) = content_length else {
            return self.read_to_end(sink).await;
        };

        self.framed_read.decoder_mut().expect_length(content_length);
        let mut read = 0u64;

        let transfer = loop {
            match self.framed_read.next().await {
                Some(Ok(Inbound::Payload(PayloadItem::Chunk(bytes)))) => {
                    if let Some(sink) = sink.as_mut() {
                        sink.write_all(&bytes).await?;
                    }
                    read += bytes.len() as u64;
                }
                Some(Ok(Inbound::Payload(PayloadItem::Eof))) => break Transfer::Complete(read),
                Some(Ok(Inbound::Line(_))) => return Err(unexpected_frame()),
                Some(Err(e)) => return Err(e),
                None => {
                    debug!(read, content_length, "body ended before content length");
                    break Transfer::Eof(read);
                }
            }
        };

        self.framed_read.decoder_mut().expect_line(LineKind::Line, HTTP_LINE);
        Ok(transfer)
    }

    /// Decodes a chunked body into `sink`, returning the decoded size.
    pub async fn read_chunked(&mut self, mut sink: Option<BodySink<'_>>) -> Result<u64, ParseError> {
        self.framed_read.decoder_mut().expect_chunked();
        let mut read = 0u64;

        loop {
            match self.framed_read.next().await {
                Some(Ok(Inbound::Payload(PayloadItem::Chunk(bytes)))) => {
                    if let Some(sink) = sink.as_mut() {
                        sink.write_all(&bytes).await?;
                    }
                    read += bytes.len() as u64;
                }
                Some(Ok(Inbound::Payload(PayloadItem::Eof))) => break,
                Some(Ok(Inbound::Line(_))) => return Err(unexpected_frame()),
                Some(Err(e)) => return Err(e),
                None => return Err(ParseError::UnexpectedEof),
            }
        }

        self.framed_read.decoder_mut().expect_line(LineKind::Line, HTTP_LINE);
        debug!(read, "read chunked body");
        Ok(read)
    }

    async fn read_to_end(&mut self, mut sink: Option<BodySink<'_>>) -> Result<Transfer, ParseError> {
        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut read = 0u64;

        while let RawRead::Data(n) = self.read_raw(&mut buf).await? {
            if let Some(sink) = sink.as_mut() {
                sink.write_all(&buf[..n]).await?;
            }
            read += n as u64;
        }

        Ok(Transfer::Complete(read))
    }

    async fn read_line(&mut self) -> Result<bytes::Bytes, ParseError> {
        match self.framed_read.next().await {
            Some(Ok(Inbound::Line(line))) => Ok(line),
            Some(Ok(Inbound::Payload(_))) => Err(unexpected_frame()),
            Some(Err(e)) => Err(e),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn start_headers(&mut self) {
        self.last_header = None;
        self.framed_read.decoder_mut().expect_line(LineKind::Line, HTTP_LINE);
    }
}

fn unexpected_frame() -> ParseError {
    ParseError::io(std::io::Error::other("decoder produced a frame of the wrong kind"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;
    use indoc::indoc;
    use tokio::io::duplex;

    fn reading(input: &'static str) -> HttpStream<&'static [u8], Vec<u8>> {
        HttpStream::new(input.as_bytes(), Vec::new())
    }

    async fn written(mut stream: HttpStream<&'static [u8], Vec<u8>>) -> String {
        stream.flush().await.unwrap();
        let (_, output) = stream.into_inner();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn request_head() {
        let mut stream = reading(indoc! {"
            GET /index.html HTTP/1.1\r
            Host: localhost\r
            Accept: */*\r
            \r
            "});

        let request_line = stream.read_request().await.unwrap();
        assert_eq!(request_line.method(), &Method::GET);
        assert_eq!(request_line.path(), "/index.html");

        let HeaderItem::Field(host) = stream.read_header().await.unwrap() else { panic!("expected a header") };
        assert_eq!(host.name(), &header::HOST);
        assert_eq!(host.value(), "localhost");

        assert!(!stream.read_header().await.unwrap().is_end());
        assert!(stream.read_header().await.unwrap().is_end());
    }

    #[tokio::test]
    async fn folded_header() {
        let mut stream = reading("X-Long: first\r\n  second\r\nX-Other: b\r\n\r\n");

        let HeaderItem::Field(first) = stream.read_header().await.unwrap() else { panic!("expected a header") };
        assert!(!first.is_folded());

        let HeaderItem::Field(second) = stream.read_header().await.unwrap() else { panic!("expected a header") };
        assert!(second.is_folded());
        assert_eq!(second.name().as_str(), "x-long");
        assert_eq!(second.value(), "second");

        let mut stream = reading("X-Long: first\r\n  second\r\nX-Other: b\r\n\r\n");
        let headers = stream.read_headers().await.unwrap();
        assert_eq!(headers.get("x-long").unwrap(), "first second");
        assert_eq!(headers.get("x-other").unwrap(), "b");
    }

    #[tokio::test]
    async fn repeated_headers_are_kept() {
        let mut stream = reading("Set-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n");
        let headers = stream.read_headers().await.unwrap();

        let cookies: Vec<_> = headers.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
    }

    #[tokio::test]
    async fn oversized_request_line() {
        let input: &'static str = Box::leak(format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(HTTP_LINE)).into_boxed_str());
        let mut stream = reading(input);

        let error = stream.read_request().await.unwrap_err();
        assert!(matches!(error, ParseError::TooLongLine { .. }));
        assert_eq!(error.status(), StatusCode::URI_TOO_LONG);
    }

    #[tokio::test]
    async fn eof_before_request() {
        let mut stream = reading("");
        assert!(matches!(stream.read_request().await, Err(ParseError::UnexpectedEof)));

        let mut stream = reading("GET / HTTP/1.1\r\nHost: a\r\n");
        stream.read_request().await.unwrap();
        stream.read_header().await.unwrap();
        assert!(matches!(stream.read_header().await, Err(ParseError::UnexpectedEof)));
    }

    #[tokio::test]
    async fn body_after_head() {
        let mut stream = reading("POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world");
        stream.read_request().await.unwrap();
        stream.read_headers().await.unwrap();

        let mut body = Vec::new();
        let transfer = stream.read_body(Some(&mut body), Some(11)).await.unwrap();
        assert_eq!(transfer, Transfer::Complete(11));
        assert_eq!(body, b"hello world");
    }

    #[tokio::test]
    async fn short_body() {
        let mut stream = reading("POST / HTTP/1.1\r\n\r\nabc");
        stream.read_request().await.unwrap();
        stream.read_headers().await.unwrap();

        assert_eq!(stream.read_body(None, Some(10)).await.unwrap(), Transfer::Eof(3));
    }

    #[tokio::test]
    async fn body_until_close() {
        let mut stream = reading("HTTP/1.0 200 OK\r\n\r\nclose delimited");
        stream.read_response().await.unwrap();
        stream.read_headers().await.unwrap();

        let mut body = Vec::new();
        assert_eq!(stream.read_body(Some(&mut body), None).await.unwrap(), Transfer::Complete(15));
        assert_eq!(body, b"close delimited");
    }

    #[tokio::test]
    async fn raw_reads_serve_buffer_first() {
        let mut stream = reading("PUT / HTTP/1.1\r\n\r\n0123456789");
        stream.read_request().await.unwrap();
        stream.read_headers().await.unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(stream.read_raw(&mut buf).await.unwrap(), RawRead::Data(4));
        assert_eq!(&buf, b"0123");

        let mut rest = [0u8; 32];
        assert_eq!(stream.read_raw(&mut rest).await.unwrap(), RawRead::Data(6));
        assert_eq!(&rest[..6], b"456789");
        assert!(stream.read_raw(&mut rest).await.unwrap().is_eof());
    }

    #[tokio::test]
    async fn raw_read_into_empty_buffer() {
        let mut stream = reading("");
        assert_eq!(stream.read_raw(&mut [0u8; 0]).await.unwrap(), RawRead::Data(0));
        assert!(stream.read_raw(&mut [0u8; 8]).await.unwrap().is_eof());
    }

    fn header_section(count: usize) -> &'static str {
        let mut head: String = (0..count).map(|i| format!("X-Header-{i}: {i}\r\n")).collect();
        head.push_str("\r\n");
        Box::leak(head.into_boxed_str())
    }

    #[tokio::test]
    async fn header_count_limit() {
        let mut stream = reading(header_section(HTTP_HEADERS_MAX));
        assert_eq!(stream.read_headers().await.unwrap().len(), HTTP_HEADERS_MAX);

        let mut stream = reading(header_section(HTTP_HEADERS_MAX + 1));
        let error = stream.read_headers().await.unwrap_err();
        assert!(matches!(error, ParseError::TooManyHeaders { max_num: HTTP_HEADERS_MAX }));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn truncated_chunked_body() {
        let mut stream = reading("HTTP/1.1 200 OK\r\n\r\n5\r\nhel");
        stream.read_response().await.unwrap();
        stream.read_headers().await.unwrap();

        assert!(matches!(stream.read_chunked(None).await, Err(ParseError::UnexpectedEof)));
    }

    #[tokio::test]
    async fn response_head_and_fixed_body() {
        let mut stream = reading("");
        stream.write_response(Version::HTTP_11, StatusCode::NOT_FOUND, None).unwrap();
        stream.write_header("Content-Length", format_args!("{}", 9)).unwrap();
        stream.end_headers().unwrap();
        stream.write_body(b"not found").await.unwrap();

        assert_eq!(written(stream).await, "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\n\r\nnot found");
    }

    #[tokio::test]
    async fn request_head_without_headers() {
        let mut stream = reading("");
        stream.write_request(&Method::GET, "/", Version::HTTP_10).unwrap();
        stream.end_headers().unwrap();

        assert_eq!(written(stream).await, "GET / HTTP/1.0\r\n\r\n");
    }

    #[tokio::test]
    async fn write_from_short_source() {
        let mut stream = reading("");
        stream.write_response(Version::HTTP_11, StatusCode::OK, Some("Fine")).unwrap();
        stream.end_headers().unwrap();

        let mut source = &b"abc"[..];
        assert_eq!(stream.write_from(&mut source, 10).await.unwrap(), Transfer::Eof(3));
        assert_eq!(written(stream).await, "HTTP/1.1 200 Fine\r\n\r\nabc");
    }

    #[tokio::test]
    async fn write_from_stops_at_length() {
        let mut stream = reading("");
        let mut source = &b"abcdef"[..];

        assert_eq!(stream.write_from(&mut source, 4).await.unwrap(), Transfer::Complete(4));
        assert_eq!(written(stream).await, "abcd");
    }

    #[tokio::test]
    async fn chunk_after_finish() {
        let mut stream = reading("");
        stream.write_chunk(b"data").await.unwrap();
        stream.finish_chunks().await.unwrap();

        assert!(matches!(stream.write_chunk(b"late").await, Err(SendError::ChunksFinished)));
        assert!(matches!(stream.print_chunk(format_args!("late")), Err(SendError::ChunksFinished)));
        assert_eq!(written(stream).await, "4\r\ndata\r\n0\r\n\r\n");
    }

    #[tokio::test]
    async fn chunked_response_round_trip() {
        let (near, far) = duplex(64 * 1024);
        let (near_read, near_write) = tokio::io::split(near);
        let (far_read, far_write) = tokio::io::split(far);

        let mut server = HttpStream::new(near_read, near_write);
        server.write_response(Version::HTTP_11, StatusCode::OK, None).unwrap();
        server.write_header("Content-Type", "text/plain").unwrap();
        server.write_header("Transfer-Encoding", "chunked").unwrap();
        server.end_headers().unwrap();
        server.write_chunk(b"hello ").await.unwrap();
        server.print_chunk(format_args!("{}!", "world")).unwrap();
        server.finish_chunks().await.unwrap();
        server.shutdown().await.unwrap();

        let mut client = HttpStream::new(far_read, far_write);
        let status_line = client.read_response().await.unwrap();
        assert_eq!(status_line.status(), StatusCode::OK);
        assert_eq!(status_line.reason(), "OK");

        let headers = client.read_headers().await.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get(header::TRANSFER_ENCODING).unwrap(), "chunked");

        let mut body = Vec::new();
        assert_eq!(client.read_chunked(Some(&mut body)).await.unwrap(), 12);
        assert_eq!(body, b"hello world!");
    }
}
