use async_trait::async_trait;
use http::StatusCode;

use crate::{HandlerError, ServerClient};

/// What a handler did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler sent a status line itself
    Responded,
    /// The server should answer with this status, default reason and no body
    Status(StatusCode),
}

/// Request handler bound to a method and path prefix.
///
/// A handler pulls whatever it needs from the request through `client` and
/// writes its response through the same value, status first, then headers,
/// then the body.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, client: &mut ServerClient) -> Result<Outcome, HandlerError>;
}
