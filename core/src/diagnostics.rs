//! Failure diagnostics. Only error outcomes are reported here.

use std::fmt::Write;

use crate::error::RequestError;
use crate::http::{HttpMethod, CONTENT_TYPE};

/// Emit one `error`-level log entry describing a failed request.
pub(crate) fn log_failure(error: &RequestError) {
    if log::log_enabled!(log::Level::Error) {
        log::error!("{}", describe_failure(error));
    }
}

/// Multi-line description: code and message, the request, the POST
/// parameters, the raw response body and the response status. A response
/// whose body could not be read still reports its status and URL.
pub(crate) fn describe_failure(error: &RequestError) -> String {
    let mut entry = format!("request failed (code {}): {error}", error.code());

    match error {
        RequestError::Serialization { url, .. } => {
            let _ = write!(entry, "\n  request: POST {url}");
        }
        _ => {
            if let Some(request) = error.request() {
                let _ = write!(entry, "\n  request: {} {}", request.method, request.url);
                if request.method == HttpMethod::Post {
                    let params = request.body.as_deref().unwrap_or("<none>");
                    let _ = write!(entry, "\n  params: {params}");
                }
            }
        }
    }

    if let Some(response) = error.response() {
        if let Some(content_type) = response.header(CONTENT_TYPE) {
            let _ = write!(entry, "\n  content-type: {content_type}");
        }
        if let Some(body) = response.body_text() {
            let _ = write!(entry, "\n  response body: {body}");
        }
    }
    if let (Some(status), Some(url)) = (error.status(), error.response_url()) {
        let _ = write!(entry, "\n  response: HTTP {status} from {url}");
    }

    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};

    fn post_request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: "http://localhost:3000/login".to_string(),
            headers: Vec::new(),
            body: Some(r#"{"u":"x"}"#.to_string()),
        }
    }

    #[test]
    fn decode_failure_includes_body_and_status() {
        let err = RequestError::Decode {
            message: "expected value at line 1 column 1".to_string(),
            request: post_request(),
            response: HttpResponse {
                status: 502,
                url: "http://localhost:3000/login".to_string(),
                headers: vec![("Content-Type".to_string(), "text/html".to_string())],
                body: b"Bad Gateway".to_vec(),
            },
        };
        let entry = describe_failure(&err);
        assert!(entry.starts_with("request failed (code 1001)"));
        assert!(entry.contains("request: POST http://localhost:3000/login"));
        assert!(entry.contains(r#"params: {"u":"x"}"#));
        assert!(entry.contains("content-type: text/html"));
        assert!(entry.contains("response body: Bad Gateway"));
        assert!(entry.contains("HTTP 502 from http://localhost:3000/login"));
    }

    #[test]
    fn transport_failure_has_no_response_section() {
        let err = RequestError::Transport {
            source: TransportError::Request("connection refused".to_string()),
            request: HttpRequest {
                method: HttpMethod::Get,
                url: "http://localhost:1/users".to_string(),
                headers: Vec::new(),
                body: None,
            },
        };
        let entry = describe_failure(&err);
        assert!(entry.contains("connection refused"));
        assert!(entry.contains("request: GET http://localhost:1/users"));
        assert!(!entry.contains("params"));
        assert!(!entry.contains("response"));
    }

    #[test]
    fn body_read_failure_reports_status_and_url() {
        let err = RequestError::Transport {
            source: TransportError::ResponseBody {
                status: 503,
                url: "http://localhost:3000/login".to_string(),
                message: "connection reset by peer".to_string(),
            },
            request: post_request(),
        };
        let entry = describe_failure(&err);
        assert!(entry.starts_with("request failed (code 1000)"));
        assert!(entry.contains("failed to read response body: connection reset by peer"));
        assert!(entry.contains(r#"params: {"u":"x"}"#));
        assert!(entry.contains("response: HTTP 503 from http://localhost:3000/login"));
        assert!(!entry.contains("\n  response body:"));
    }
}
