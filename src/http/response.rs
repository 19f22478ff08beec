//! Outgoing HTTP response and its wire serialization.
//!
//! [`HttpResponse`] is a plain builder: every setter accepts any value and
//! nothing is validated. A malformed version, a negative-looking status or a
//! non-canonical header name ends up verbatim in the serialized bytes.
//!
//! ## Wire format
//!
//! ```text
//! <version> <code> <message><EOL>
//! Date: <IMF-fixdate><EOL>
//! Connection: close<EOL>
//! <name>: <value><EOL>          zero or more, insertion order
//! Content-Length: <len><EOL>
//! <separator>
//! <body>
//! ```
//!
//! `Date` and `Content-Length` are computed when serializing, never stored.
//! `<EOL>` and `<separator>` depend on the [`Framing`].

use serde::Deserialize;
use std::time::SystemTime;

use crate::config::{HttpConfig, config};
use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;

const CONTENT_LENGTH: &str = "Content-Length";

/// Line terminator and header/body separator used by [`HttpResponse::serialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// `\r\n` terminators and a single blank line before the body.
    #[default]
    Standard,

    /// `\n` terminators and two blank lines before the body.
    ///
    /// Kept for clients that depend on the historical byte layout. Standard
    /// parsers read the extra newline as the first body byte.
    Legacy,
}

impl Framing {
    fn line_end(self) -> &'static str {
        match self {
            Framing::Standard => "\r\n",
            Framing::Legacy => "\n",
        }
    }

    /// Written after the terminator of the `Content-Length` line.
    fn head_end(self) -> &'static str {
        match self {
            Framing::Standard => "\r\n",
            Framing::Legacy => "\n\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    protocol_version: String,
    status_code: u16,
    status_message: String,
    headers: HttpHeaders,
    body: Vec<u8>,
    framing: Framing,
}

impl HttpResponse {
    /// A `200 OK` response with no headers and an empty body, using the
    /// process-wide [`config`].
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(cfg: &HttpConfig) -> Self {
        Self {
            protocol_version: cfg.protocol_version.clone(),
            status_code: HttpStatus::Ok.code(),
            status_message: HttpStatus::Ok.reason().to_string(),
            headers: HttpHeaders::new(),
            body: Vec::new(),
            framing: cfg.framing,
        }
    }

    pub fn set_protocol_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.protocol_version = version.into();
        self
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    pub fn set_status_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.status_message = message.into();
        self
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Sets the status code together with its canonical reason phrase.
    pub fn set_status(&mut self, status: HttpStatus) -> &mut Self {
        self.status_code = status.code();
        self.status_message = status.reason().to_string();
        self
    }

    /// Inserts or silently overwrites a header. Names are matched exactly.
    ///
    /// A header named `Content-Length` (any casing) is accepted but never
    /// serialized: the length is always derived from the body.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn set_content(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn content(&self) -> &[u8] {
        &self.body
    }

    pub fn set_framing(&mut self, framing: Framing) -> &mut Self {
        self.framing = framing;
        self
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Serializes the response with a `Date` taken from the wall clock.
    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_at(SystemTime::now())
    }

    /// Serializes the response with `Date` set to `now`.
    pub fn serialize_at(&self, now: SystemTime) -> Vec<u8> {
        let eol = self.framing.line_end();

        tracing::trace!(
            status = self.status_code,
            headers = self.headers.len(),
            body_len = self.body.len(),
            "serializing response"
        );

        let mut head = format!(
            "{} {} {}{eol}",
            self.protocol_version, self.status_code, self.status_message
        );
        head.push_str(&format!("Date: {}{eol}", httpdate::fmt_http_date(now)));
        head.push_str(&format!("Connection: close{eol}"));

        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                continue;
            }
            head.push_str(&format!("{name}: {value}{eol}"));
        }

        head.push_str(&format!("{CONTENT_LENGTH}: {}{eol}", self.body.len()));
        head.push_str(self.framing.head_end());

        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}
