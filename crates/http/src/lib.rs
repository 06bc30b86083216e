//! A minimal asynchronous HTTP/1.x protocol engine.
//!
//! This crate reads and writes HTTP/1.0 and HTTP/1.1 messages over any pair of
//! tokio byte streams, one message element at a time, and opens TCP
//! connections to hosts with several resolved addresses. It holds no server
//! or routing logic; `hearth-server` builds those on top.
//!
//! # Example
//!
//! ```no_run
//! use hearth_http::connection::HttpStream;
//! use hearth_http::connector::{ConnectOptions, connect};
//! use http::{Method, Version};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = connect("localhost", 8080, &ConnectOptions::new()).await?;
//! let (reader, writer) = stream.into_split();
//! let mut http = HttpStream::new(reader, writer);
//!
//! http.write_request(&Method::GET, "/", Version::HTTP_11)?;
//! http.write_header("Host", "localhost")?;
//! http.end_headers()?;
//! http.flush().await?;
//!
//! let status_line = http.read_response().await?;
//! let headers = http.read_headers().await?;
//! println!("{status_line} with {} headers", headers.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: message types, limits and errors
//! - [`codec`]: line, header and body framing built on `tokio_util::codec`
//! - [`connection`]: [`HttpStream`](connection::HttpStream), the pull based
//!   reader and writer for one exchange
//! - [`connector`]: multi-candidate TCP connect
//!
//! # Limits
//!
//! Every line is capped at [`HTTP_LINE`](protocol::HTTP_LINE) bytes, a method
//! at 64, a path at 1024 and a `Host` value at 256. Exceeding one is an error,
//! input is never truncated.

pub mod codec;
pub mod connection;
pub mod connector;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
