//! Embeddable HTTP/1.x server on top of `hearth-http`.
//!
//! A [`Server`] owns an ordered table of (method, path prefix, handler)
//! bindings. Each accepted connection carries exactly one request: the server
//! reads its head, hands a [`ServerClient`] to the first matching
//! [`Handler`], fills in whatever the handler left out of the response and
//! closes the connection.
//!
//! ```no_run
//! use std::net::SocketAddr;
//!
//! use hearth_server::static_files::{MimeTable, StaticFiles};
//! use hearth_server::Server;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let files = StaticFiles::new("./public", MimeTable::default())?;
//! let server = files.bind(Server::builder(), "/").bind(SocketAddr::from(([127, 0, 0, 1], 8080))).build()?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Handlers answer either by writing the response themselves and returning
//! [`Outcome::Responded`], or by returning [`Outcome::Status`] and letting
//! the server send a bare status. A failing handler becomes a 500.

mod client;
mod error;
mod handler;
mod router;
mod server;

pub mod static_files;

pub use client::Connection;
pub use client::ResponseState;
pub use client::ServerClient;
pub use error::HandlerError;
pub use error::ServerError;
pub use handler::Handler;
pub use handler::Outcome;
pub use router::HandlerBinding;
pub use router::Router;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
