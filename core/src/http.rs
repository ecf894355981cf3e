//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `HttpClient` builds `HttpRequest`
//! values and decodes `HttpResponse` values; a `Transport` performs the
//! actual round-trip in between. Keeping the boundary as data lets tests swap
//! the network for a fake without touching the client logic.
//!
//! All fields use owned types (`String`, `Vec`) so requests can be moved onto
//! background threads and stored inside errors without lifetime concerns.

use std::fmt;

pub const CONTENT_TYPE: &str = "content-type";
pub const ACCEPT: &str = "accept";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request. Only GET and POST are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is the base URL concatenated with the request path, unvalidated.
/// `body` holds the JSON-encoded parameters of a POST, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// `body` is kept as raw bytes; it is only interpreted as JSON by the codec
/// and as text by the failure diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The body as UTF-8 text, or `None` if it is not valid UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
