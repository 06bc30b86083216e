//! Multi-candidate TCP connect.
//!
//! A host name may resolve to several addresses. [`connect`] tries them in
//! resolver order and returns the first connection that completes. Each
//! attempt is a non-blocking connect that suspends the task until the socket
//! becomes writable and then checks the socket's pending error; both steps
//! happen inside [`TcpSocket::connect`].

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpSocket, TcpStream, lookup_host};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve { host: String, port: u16, source: io::Error },

    #[error("no address available, last candidate {addr} failed: {source}")]
    NoAddressAvailable { addr: SocketAddr, source: io::Error },

    #[error("no address candidates")]
    NoCandidates,
}

/// Options applied to every connect attempt.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    timeout: Option<Duration>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives up on a single candidate after `timeout` and moves to the next
    /// one. Without it an attempt waits as long as the OS does.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Resolves `host:port` and connects to the first reachable candidate.
pub async fn connect(host: &str, port: u16, options: &ConnectOptions) -> Result<TcpStream, ConnectError> {
    let candidates: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|source| ConnectError::Resolve { host: host.to_string(), port, source })?
        .collect();

    debug!(host, port, candidates = candidates.len(), "resolved host");
    connect_candidates(&candidates, options).await
}

/// Connects to the first of `candidates` that accepts, in order.
///
/// Every failed candidate is logged at `warn` before the next is tried.
pub async fn connect_candidates(candidates: &[SocketAddr], options: &ConnectOptions) -> Result<TcpStream, ConnectError> {
    let mut last_error = None;

    for &addr in candidates {
        match connect_one(addr, options).await {
            Ok(stream) => {
                match stream.local_addr() {
                    Ok(local) => info!(local = %local, peer = %addr, "connected"),
                    Err(_) => info!(peer = %addr, "connected"),
                }
                return Ok(stream);
            }
            Err(e) => {
                warn!(addr = %addr, cause = %e, "connect failed, trying next candidate");
                last_error = Some((addr, e));
            }
        }
    }

    match last_error {
        Some((addr, source)) => Err(ConnectError::NoAddressAvailable { addr, source }),
        None => Err(ConnectError::NoCandidates),
    }
}

async fn connect_one(addr: SocketAddr, options: &ConnectOptions) -> io::Result<TcpStream> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };

    match options.timeout {
        Some(timeout) => tokio::time::timeout(timeout, socket.connect(addr))
            .await
            .map_err(|elapsed| io::Error::new(io::ErrorKind::TimedOut, elapsed))?,
        None => socket.connect(addr).await,
    }
}
