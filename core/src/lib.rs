//! JSON HTTP client with stubbable responses.
//!
//! # Overview
//! `HttpClient` issues GET and POST requests against a base URL and decodes
//! every response body as JSON. Before touching the network it consults a
//! `StubRegistry`; a registered stub for the exact `(method, path)` is
//! returned as-is, which makes request flows deterministic in tests and
//! usable offline.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`);
//!   the `Transport` trait performs the round-trip (`UreqTransport` by
//!   default).
//! - Every call yields exactly one `Result<Value, RequestError>`. Errors are
//!   never raised out of GET/POST; only broken fixtures panic, at setup time.
//! - Execution mode is explicit: `*_sync` methods return the outcome,
//!   callback methods follow the client's `ExecutionMode`.
//! - Stubs live in an injectable registry; `StubRegistry::shared()` is the
//!   process-wide default.

pub mod client;
pub mod codec;
mod diagnostics;
pub mod error;
pub mod hooks;
pub mod http;
pub mod stub;
pub mod transport;

pub use client::{ExecutionMode, HttpClient, HttpClientBuilder, Outcome};
pub use error::{ErrorKind, FixtureError, RequestError, TransportError};
pub use hooks::{ActivityObserver, CompletionDispatcher, MainThreadQueue};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use stub::StubRegistry;
pub use transport::{Transport, UreqTransport};
