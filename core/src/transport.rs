//! Request execution.
//!
//! `Transport` is the seam between the client and the network. The client
//! only ever hands it a fully built `HttpRequest` and expects an
//! `HttpResponse` back; TLS, DNS and connection reuse live behind it.

use std::fmt;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Blocking HTTP round-trip. Implementations must not treat 4xx/5xx as
/// errors; status interpretation is left to the caller.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// `timeout` bounds the whole round-trip. `None` keeps ureq's defaults.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => {
                with_headers(self.agent.get(request.url.as_str()), request).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(request.url.as_str()), request).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(request.url.as_str()), request).send_empty()
            }
        };
        let mut response = result.map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // ureq caps `read_to_vec` at 10 MiB by default; responses are unbounded.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| TransportError::ResponseBody {
                status,
                url: request.url.clone(),
                message: e.to_string(),
            })?;

        Ok(HttpResponse {
            status,
            url: request.url.clone(),
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
