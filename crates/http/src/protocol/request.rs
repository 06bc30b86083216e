//! HTTP request line handling.
//!
//! A [`RequestLine`] is the first line of a request: method, path and version.
//! Headers are read separately, one at a time, so the request line is the
//! only part of the request a connection has to hold on to.

use std::fmt;

use http::{Method, Version};

/// The parsed `METHOD SP PATH SP HTTP/1.x` line of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    path: String,
    version: Version,
}

impl RequestLine {
    pub fn new(method: Method, path: impl Into<String>, version: Version) -> Self {
        Self { method, path: path.into(), version }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request target, query string included.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn into_parts(self) -> (Method, String, Version) {
        (self.method, self.path, self.version)
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.method, self.path, self.version)
    }
}
