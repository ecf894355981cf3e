//! Error types for the HTTP client.
//!
//! # Design
//! Per-request failures are values, never panics: every GET/POST outcome is
//! a `Result<Value, RequestError>`. Each variant keeps the context needed to
//! diagnose it (the request that was sent, the response that came back).
//! Fixture problems get their own `FixtureError` because they happen at stub
//! setup time, not at request time.

use std::path::PathBuf;

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// Stable code reported for transport failures.
pub const TRANSPORT_ERROR_CODE: i32 = 1000;
/// Sentinel code reported when a response body is not valid JSON.
pub const DECODE_ERROR_CODE: i32 = 1001;
/// Stable code reported when POST parameters cannot be encoded.
pub const SERIALIZATION_ERROR_CODE: i32 = 1002;

/// Failure reported by a `Transport` while executing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or no response was received. Covers
    /// connection failures and URLs the transport refuses to parse.
    #[error("request failed: {0}")]
    Request(String),

    /// A response arrived but its body could not be read. The status line
    /// was already received and is kept for diagnostics.
    #[error("failed to read response body: {message}")]
    ResponseBody {
        status: u16,
        url: String,
        message: String,
    },
}

impl TransportError {
    /// Status of the response, if one was received before the failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::ResponseBody { status, .. } => Some(*status),
            TransportError::Request(_) => None,
        }
    }

    /// URL of the response, if one was received before the failure.
    pub fn response_url(&self) -> Option<&str> {
        match self {
            TransportError::ResponseBody { url, .. } => Some(url),
            TransportError::Request(_) => None,
        }
    }
}

/// Coarse classification of a `RequestError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    Serialization,
}

/// Errors delivered to GET/POST callers.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The transport failed; passed through unmodified.
    #[error("transport error: {source}")]
    Transport {
        #[source]
        source: TransportError,
        request: HttpRequest,
    },

    /// The response body is present but is not valid JSON.
    #[error("response body is not valid JSON: {message}")]
    Decode {
        message: String,
        request: HttpRequest,
        response: HttpResponse,
    },

    /// The POST parameters could not be encoded to JSON. No request was sent.
    #[error("request parameters could not be serialized: {message}")]
    Serialization { message: String, url: String },
}

impl RequestError {
    /// Which of the three failure classes this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Transport { .. } => ErrorKind::Transport,
            RequestError::Decode { .. } => ErrorKind::Decode,
            RequestError::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    /// Stable numeric code for the error kind (`*_ERROR_CODE`).
    pub fn code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Transport => TRANSPORT_ERROR_CODE,
            ErrorKind::Decode => DECODE_ERROR_CODE,
            ErrorKind::Serialization => SERIALIZATION_ERROR_CODE,
        }
    }

    /// The request that was sent, if the failure happened after building it.
    pub fn request(&self) -> Option<&HttpRequest> {
        match self {
            RequestError::Transport { request, .. } | RequestError::Decode { request, .. } => {
                Some(request)
            }
            RequestError::Serialization { .. } => None,
        }
    }

    /// The fully read response, if any. Set only for decode failures.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            RequestError::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Transport { source, .. } => source.status(),
            _ => self.response().map(|r| r.status),
        }
    }

    /// URL the response came from, if one was received.
    pub fn response_url(&self) -> Option<&str> {
        match self {
            RequestError::Transport { source, .. } => source.response_url(),
            _ => self.response().map(|r| r.url.as_str()),
        }
    }
}

/// Errors raised while loading a fixture file for a stub.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("fixture `{}` not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("fixture `{}` could not be read: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture `{}` is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
