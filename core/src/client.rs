//! Stub-first JSON HTTP client.
//!
//! # Design
//! `HttpClient` resolves every request the same way: an exact-match stub
//! for `(method, path)` wins; otherwise the request is built, handed to the
//! `Transport`, and the response body decoded as JSON. The caller always
//! receives exactly one `Result<Value, RequestError>`.
//!
//! Building and decoding are exposed separately (`build_*`,
//! `parse_response`) so a host can execute requests itself. `get_sync` and
//! `post_sync` run the whole pipeline on the calling thread and return the
//! outcome. `get` and `post` take a completion callback and follow the
//! client's `ExecutionMode`.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::codec;
use crate::diagnostics;
use crate::error::{RequestError, TransportError};
use crate::hooks::{ActivityObserver, CompletionDispatcher};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ACCEPT, APPLICATION_JSON, CONTENT_TYPE};
use crate::stub::StubRegistry;
use crate::transport::{Transport, UreqTransport};

/// Outcome of a GET or POST.
pub type Outcome = Result<Value, RequestError>;

/// How `get` and `post` deliver their completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// The request runs on the calling thread and the completion has been
    /// invoked by the time `get`/`post` returns. Intended for tests.
    Blocking,
    /// `get`/`post` return immediately; the request runs on a background
    /// thread and the completion is delivered through the dispatcher, if
    /// any, or on that thread.
    ///
    /// Each live request gets its own short-lived OS thread and the number
    /// in flight is not bounded. Stub hits never spawn.
    #[default]
    Background,
}

#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    stubs: Arc<StubRegistry>,
    transport: Arc<dyn Transport>,
    mode: ExecutionMode,
    observer: Option<Arc<dyn ActivityObserver>>,
    dispatcher: Option<Arc<dyn CompletionDispatcher>>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("mode", &self.mode)
            .field("stubs", &self.stubs.len())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Client on the shared stub registry with the default transport, in
    /// background mode.
    pub fn new(base_url: &str) -> Self {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: &str) -> HttpClientBuilder {
        HttpClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// The registry this client consults before going to the network.
    pub fn stubs(&self) -> &Arc<StubRegistry> {
        &self.stubs
    }

    /// Base URL and path are concatenated as-is.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn build_get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url_for(path),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_post<P>(&self, path: &str, params: Option<&P>) -> Result<HttpRequest, RequestError>
    where
        P: Serialize + ?Sized,
    {
        let url = self.url_for(path);
        let body = params
            .map(codec::encode)
            .transpose()
            .map_err(|e| RequestError::Serialization {
                message: e.to_string(),
                url: url.clone(),
            })?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![
                (CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()),
                (ACCEPT.to_string(), APPLICATION_JSON.to_string()),
            ],
            body,
        })
    }

    /// Decode the body of `response` to the request's outcome. HTTP status
    /// is not interpreted: a JSON body is a success whatever the status.
    pub fn parse_response(&self, request: &HttpRequest, response: HttpResponse) -> Outcome {
        codec::decode(&response.body).map_err(|e| RequestError::Decode {
            message: e.to_string(),
            request: request.clone(),
            response,
        })
    }

    pub fn get_sync(&self, path: &str) -> Outcome {
        if let Some(value) = self.stubbed(HttpMethod::Get, path) {
            return Ok(value);
        }
        self.execute(self.build_get(path))
    }

    pub fn post_sync<P>(&self, path: &str, params: Option<&P>) -> Outcome
    where
        P: Serialize + ?Sized,
    {
        if let Some(value) = self.stubbed(HttpMethod::Post, path) {
            return Ok(value);
        }
        match self.build_post(path, params) {
            Ok(request) => self.execute(request),
            Err(err) => {
                diagnostics::log_failure(&err);
                Err(err)
            }
        }
    }

    pub fn get<F>(&self, path: &str, completion: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        if let Some(value) = self.stubbed(HttpMethod::Get, path) {
            completion(Ok(value));
            return;
        }
        self.dispatch(self.build_get(path), completion);
    }

    pub fn post<P, F>(&self, path: &str, params: Option<&P>, completion: F)
    where
        P: Serialize + ?Sized,
        F: FnOnce(Outcome) + Send + 'static,
    {
        if let Some(value) = self.stubbed(HttpMethod::Post, path) {
            completion(Ok(value));
            return;
        }
        match self.build_post(path, params) {
            Ok(request) => self.dispatch(request, completion),
            Err(err) => {
                diagnostics::log_failure(&err);
                completion(Err(err));
            }
        }
    }

    fn stubbed(&self, method: HttpMethod, path: &str) -> Option<Value> {
        let value = self.stubs.lookup(method, path)?;
        log::debug!("{method} {path} served from stub");
        Some(value)
    }

    /// Send `request` through the transport and decode the result.
    fn execute(&self, request: HttpRequest) -> Outcome {
        log::trace!("{} {}", request.method, request.url);
        if let Some(observer) = &self.observer {
            observer.request_started(&request);
        }

        let outcome = match self.transport.execute(&request) {
            Ok(response) => self.parse_response(&request, response),
            Err(source) => Err(RequestError::Transport {
                source,
                request: request.clone(),
            }),
        };

        if let Some(observer) = &self.observer {
            observer.request_finished(&request);
        }
        if let Err(err) = &outcome {
            diagnostics::log_failure(err);
        }
        outcome
    }

    fn dispatch<F>(&self, request: HttpRequest, completion: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        match self.mode {
            ExecutionMode::Blocking => completion(self.execute(request)),
            ExecutionMode::Background => self.spawn(request, completion),
        }
    }

    fn spawn<F>(&self, request: HttpRequest, completion: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        // Shared with the worker so the completion survives a failed spawn.
        let slot = Arc::new(Mutex::new(Some(completion)));
        let worker_slot = Arc::clone(&slot);
        let client = self.clone();
        let worker_request = request.clone();

        let spawned = thread::Builder::new()
            .name("http-request".to_string())
            .spawn(move || {
                let outcome = client.execute(worker_request);
                if let Some(completion) = worker_slot.lock().take() {
                    client.deliver(outcome, completion);
                }
            });

        if let Err(err) = spawned {
            if let Some(completion) = slot.lock().take() {
                let err = RequestError::Transport {
                    source: TransportError::Request(format!("cannot spawn request thread: {err}")),
                    request,
                };
                diagnostics::log_failure(&err);
                self.deliver(Err(err), completion);
            }
        }
    }

    fn deliver<F>(&self, outcome: Outcome, completion: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.dispatch(Box::new(move || completion(outcome))),
            None => completion(outcome),
        }
    }
}

/// Configures an `HttpClient`.
pub struct HttpClientBuilder {
    base_url: String,
    stubs: Option<Arc<StubRegistry>>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
    mode: ExecutionMode,
    observer: Option<Arc<dyn ActivityObserver>>,
    dispatcher: Option<Arc<dyn CompletionDispatcher>>,
}

impl HttpClientBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            stubs: None,
            transport: None,
            timeout: None,
            mode: ExecutionMode::default(),
            observer: None,
            dispatcher: None,
        }
    }

    /// Use `stubs` instead of the process-wide registry.
    pub fn stubs(mut self, stubs: Arc<StubRegistry>) -> Self {
        self.stubs = Some(stubs);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Round-trip timeout for the default transport. Ignored when a custom
    /// transport is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ActivityObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn CompletionDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn build(self) -> HttpClient {
        let timeout = self.timeout;
        HttpClient {
            base_url: self.base_url,
            stubs: self.stubs.unwrap_or_else(StubRegistry::shared),
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(UreqTransport::with_timeout(timeout))),
            mode: self.mode,
            observer: self.observer,
            dispatcher: self.dispatcher,
        }
    }
}
