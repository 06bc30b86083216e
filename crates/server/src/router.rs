use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::handler::Handler;

/// One (method, path prefix, handler) entry of the routing table.
///
/// A `None` method matches every method and an empty prefix every path.
#[derive(Clone)]
pub struct HandlerBinding {
    method: Option<Method>,
    prefix: String,
    handler: Arc<dyn Handler>,
}

impl HandlerBinding {
    pub fn new(method: Option<Method>, prefix: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        Self { method, prefix: prefix.into(), handler }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && path.starts_with(self.prefix.as_str())
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding").field("method", &self.method).field("prefix", &self.prefix).finish_non_exhaustive()
    }
}

/// Ordered routing table; the first matching binding wins.
#[derive(Debug, Clone, Default)]
pub struct Router {
    bindings: Vec<HandlerBinding>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, binding: HandlerBinding) {
        self.bindings.push(binding);
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<&HandlerBinding> {
        self.bindings.iter().find(|binding| binding.matches(method, path))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandlerError, Outcome, ServerClient};
    use async_trait::async_trait;
    use http::StatusCode;

    struct Fixed(StatusCode);

    #[async_trait]
    impl Handler for Fixed {
        async fn handle(&self, _client: &mut ServerClient) -> Result<Outcome, HandlerError> {
            Ok(Outcome::Status(self.0))
        }
    }

    fn router(bindings: &[(Option<Method>, &str, u16)]) -> Router {
        let mut router = Router::new();
        for (method, prefix, code) in bindings {
            let handler = Arc::new(Fixed(StatusCode::from_u16(*code).unwrap()));
            router.push(HandlerBinding::new(method.clone(), *prefix, handler));
        }
        router
    }

    fn found(router: &Router, method: &Method, path: &str) -> Option<String> {
        router.find(method, path).map(|binding| binding.prefix.clone())
    }

    #[test]
    fn first_inserted_match_wins() {
        let router = router(&[(None, "/api", 200), (None, "/api/users", 201)]);

        assert_eq!(found(&router, &Method::GET, "/api/users/1").as_deref(), Some("/api"));
    }

    #[test]
    fn method_must_match_unless_wildcard() {
        let router = router(&[(Some(Method::POST), "/upload", 201), (None, "", 200)]);

        assert_eq!(found(&router, &Method::POST, "/upload").as_deref(), Some("/upload"));
        assert_eq!(found(&router, &Method::GET, "/upload").as_deref(), Some(""));
    }

    #[test]
    fn prefix_is_a_plain_string_prefix() {
        let router = router(&[(Some(Method::GET), "/static", 200)]);

        assert!(router.find(&Method::GET, "/staticfile").is_some());
        assert!(router.find(&Method::GET, "/stat").is_none());
        assert!(router.find(&Method::HEAD, "/static").is_none());
    }
}
