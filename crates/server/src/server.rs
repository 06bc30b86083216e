use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use hearth_http::connection::HttpStream;
use http::{Method, StatusCode};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::handler::{Handler, Outcome};
use crate::router::{HandlerBinding, Router};
use crate::{ResponseState, ServerClient, ServerError};

#[derive(Debug)]
pub struct ServerBuilder {
    address: Option<SocketAddr>,
    router: Router,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, router: Router::new() }
    }

    /// Address the listener binds to.
    pub fn bind(mut self, address: SocketAddr) -> Self {
        self.address = Some(address);
        self
    }

    /// Appends a binding. Bindings are tried in the order they were added.
    ///
    /// A `None` method matches any method, an empty prefix any path.
    pub fn handler(mut self, method: Option<Method>, prefix: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.router.push(HandlerBinding::new(method, prefix, Arc::new(handler)));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?;
        Ok(Server { address, router: self.router })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
}

/// HTTP/1.x server answering exactly one request per connection.
///
/// Connections are served one after another; a slow peer holds up the
/// accept loop until its exchange is done.
#[derive(Debug)]
pub struct Server {
    address: SocketAddr,
    router: Router,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Binds a listener to the configured address.
    pub async fn listen(&self) -> io::Result<TcpListener> {
        let listener = TcpListener::bind(self.address).await?;
        info!(addr = %listener.local_addr()?, "start listening");
        Ok(listener)
    }

    /// Binds and serves until the task is dropped.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = self.listen().await.inspect_err(|e| error!(cause = %e, "bind server error"))?;
        self.serve(listener).await;
        Ok(())
    }

    /// Accept loop over an already bound listener.
    pub async fn serve(&self, listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            info!(remote = %remote_addr, "accepted connection");
            let (reader, writer) = tcp_stream.into_split();
            match self.serve_connection(reader, writer).await {
                Ok(()) => info!(remote = %remote_addr, "finished process, connection shutdown"),
                Err(e) => error!(remote = %remote_addr, cause = %e, "service has error, connection shutdown"),
            }
        }
    }

    /// Runs one request/response exchange over `reader` and `writer`.
    ///
    /// The response is always completed and the write half shut down, even
    /// when the exchange fails.
    pub async fn serve_connection<R, W>(&self, reader: R, writer: W) -> Result<(), ServerError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
        let writer: Box<dyn AsyncWrite + Send + Unpin> = Box::new(writer);
        let mut client = ServerClient::new(HttpStream::new(reader, writer));

        let result = self.process(&mut client).await;
        client.finish().await;
        result
    }

    async fn process(&self, client: &mut ServerClient) -> Result<(), ServerError> {
        let shortcut = match client.read_request().await {
            Ok(()) => self.dispatch(client).await?,
            Err(e @ ServerError::Http { .. }) => {
                warn!(cause = %e, "invalid request");
                Some(e.status())
            }
            Err(e) => return Err(e),
        };

        client.drain_request_headers();

        match (shortcut, client.status()) {
            (Some(status), Some(sent)) => {
                warn!(sent = sent.as_u16(), status = status.as_u16(), "status already sent, dropping");
            }
            (Some(status), None) => client.response(status, None)?,
            (None, Some(_)) => {}
            (None, None) => {
                warn!("status not sent, defaulting to 500");
                client.response(StatusCode::INTERNAL_SERVER_ERROR, None)?;
            }
        }

        if client.response_state() == ResponseState::StatusSent {
            client.response_headers()?;
        }

        Ok(())
    }

    /// Runs the matching handler; `Some` is the status the server still has
    /// to send on the handler's behalf.
    async fn dispatch(&self, client: &mut ServerClient) -> Result<Option<StatusCode>, ServerError> {
        let Some(binding) = self.router.find(client.method(), client.path()) else {
            warn!(method = %client.method(), path = client.path(), "not found");
            return Ok(Some(StatusCode::NOT_FOUND));
        };

        match binding.handler().handle(client).await {
            Ok(Outcome::Responded) => Ok(None),
            Ok(Outcome::Status(status)) => Ok(Some(status)),
            Err(e) => match e.downcast::<ServerError>() {
                Ok(e) if e.is_invariant() => Err(*e),
                Ok(e) => {
                    warn!(cause = %e, "handler failed");
                    Ok(Some(e.status()))
                }
                Err(e) => {
                    error!(cause = %e, "handler failed");
                    Ok(Some(StatusCode::INTERNAL_SERVER_ERROR))
                }
            },
        }
    }
}
