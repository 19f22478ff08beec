use std::fmt;

use crate::error::ContextError;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::route::attributes::{AttrValue, Attributes};

/// Per-request state threaded through every pipeline stage.
///
/// The transport handle `T` (usually the client connection) and the request are
/// borrowed, never owned: the context cannot close the connection, and both
/// stay immutable for its whole lifetime. The response and the attribute store
/// are owned and mutated in place by each stage.
///
/// One context exists per request. Stages receive it as `&mut`, so two of them
/// can never mutate the same context at once.
pub struct RequestContext<'a, T: ?Sized> {
    transport: &'a T,
    request: &'a HttpRequest,
    response: HttpResponse,
    attributes: Attributes,
}

impl<'a, T: ?Sized> RequestContext<'a, T> {
    pub fn new(transport: &'a T, request: &'a HttpRequest) -> Self {
        Self {
            transport,
            request,
            response: HttpResponse::new(),
            attributes: Attributes::new(),
        }
    }

    /// Builds a context from a request that may have failed to materialize.
    pub fn try_new(
        transport: &'a T,
        request: Option<&'a HttpRequest>,
    ) -> Result<Self, ContextError> {
        let request = request.ok_or(ContextError::MissingRequest)?;
        Ok(Self::new(transport, request))
    }

    /// The connection handle, shared with the layer that owns it.
    pub fn transport(&self) -> &'a T {
        self.transport
    }

    pub fn request(&self) -> &'a HttpRequest {
        self.request
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    /// Ends the pipeline and hands the response to the transport layer.
    pub fn into_response(self) -> HttpResponse {
        self.response
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        let key = key.into();
        if let Some(previous) = self.attributes.set(key.clone(), value) {
            tracing::trace!(key = %key, ?previous, "context attribute overwritten");
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.attributes.remove(key)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl<T: ?Sized> fmt::Debug for RequestContext<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request", self.request)
            .field("response", &self.response)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
