use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;

/// An already-parsed inbound request.
///
/// Produced by a request parser through the consuming `with_*` methods and
/// only read afterwards. [`RequestContext`](crate::route::context::RequestContext)
/// borrows it immutably for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: HttpMethod,
    uri: String,
    http_version: (u8, u8),
    headers: HttpHeaders,
    body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            http_version: (1, 1),
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    pub fn with_version(mut self, major: u8, minor: u8) -> Self {
        self.http_version = (major, minor);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn http_version(&self) -> (u8, u8) {
        self.http_version
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Shorthand for `headers().get(name)`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
