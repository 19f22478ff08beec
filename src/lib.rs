//! Response serialization and per-request context for a small HTTP server.
//!
//! The crate holds the two pieces a request pipeline passes around:
//!
//! - [`HttpResponse`](http::response::HttpResponse) accumulates status line,
//!   headers and body and serializes them into wire bytes,
//! - [`RequestContext`](route::context::RequestContext) pairs the inbound
//!   request, the outgoing response, a borrowed transport handle and a free-form
//!   attribute store shared by the pipeline stages.
//!
//! Connection handling, request parsing and routing live outside this crate.
//! Nothing here performs I/O: the transport layer takes the finished response
//! with [`RequestContext::into_response`](route::context::RequestContext::into_response)
//! and writes the output of [`HttpResponse::serialize`](http::response::HttpResponse::serialize).

pub mod config;
pub mod error;
pub mod http;
pub mod route;
