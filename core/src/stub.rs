//! Canned responses that bypass the network.
//!
//! # Design
//! A `StubRegistry` keeps one table per HTTP method, each mapping an exact
//! request path to a JSON value. A registered stub wins over the transport
//! for every later request to that path until it is removed or the registry
//! is cleared.
//!
//! Clients built with `HttpClient::new` share the process-wide registry
//! returned by `StubRegistry::shared()`. Tests that must not leak stubs into
//! each other inject their own registry through `HttpClient::builder`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::FixtureError;
use crate::http::HttpMethod;

#[derive(Debug, Default)]
pub struct StubRegistry {
    get: RwLock<HashMap<String, Value>>,
    post: RwLock<HashMap<String, Value>>,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by clients without an injected one.
    pub fn shared() -> Arc<StubRegistry> {
        static SHARED: OnceLock<Arc<StubRegistry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(StubRegistry::new())))
    }

    fn table(&self, method: HttpMethod) -> &RwLock<HashMap<String, Value>> {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
        }
    }

    /// Store `response` for `(method, path)`, replacing any previous stub.
    pub fn register(&self, method: HttpMethod, path: impl Into<String>, response: Value) {
        let path = path.into();
        log::debug!("stubbing {method} {path}");
        self.table(method).write().insert(path, response);
    }

    /// Load `fixture_name` from `location` and register it as the stub for
    /// `(method, path)`.
    pub fn try_register_fixture(
        &self,
        method: HttpMethod,
        path: impl Into<String>,
        fixture_name: &str,
        location: impl AsRef<Path>,
    ) -> Result<(), FixtureError> {
        let response = load_fixture(fixture_name, location.as_ref())?;
        self.register(method, path, response);
        Ok(())
    }

    /// Like [`StubRegistry::try_register_fixture`], but a missing or
    /// malformed fixture aborts with a panic. A broken fixture must never
    /// fall through to live network calls.
    pub fn register_fixture(
        &self,
        method: HttpMethod,
        path: impl Into<String>,
        fixture_name: &str,
        location: impl AsRef<Path>,
    ) {
        if let Err(err) = self.try_register_fixture(method, path, fixture_name, location) {
            panic!("cannot register stub: {err}");
        }
    }

    /// Exact-match lookup; no pattern matching or query normalization.
    pub fn lookup(&self, method: HttpMethod, path: &str) -> Option<Value> {
        self.table(method).read().get(path).cloned()
    }

    pub fn remove(&self, method: HttpMethod, path: &str) -> Option<Value> {
        self.table(method).write().remove(path)
    }

    /// Drop every stub for both methods.
    pub fn clear(&self) {
        self.get.write().clear();
        self.post.write().clear();
    }

    pub fn len(&self) -> usize {
        self.get.read().len() + self.post.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stub_get(&self, path: impl Into<String>, response: Value) {
        self.register(HttpMethod::Get, path, response);
    }

    pub fn stub_post(&self, path: impl Into<String>, response: Value) {
        self.register(HttpMethod::Post, path, response);
    }

    pub fn stub_get_fixture(
        &self,
        path: impl Into<String>,
        fixture_name: &str,
        location: impl AsRef<Path>,
    ) {
        self.register_fixture(HttpMethod::Get, path, fixture_name, location);
    }

    pub fn stub_post_fixture(
        &self,
        path: impl Into<String>,
        fixture_name: &str,
        location: impl AsRef<Path>,
    ) {
        self.register_fixture(HttpMethod::Post, path, fixture_name, location);
    }
}

/// Read and parse a JSON fixture.
///
/// `fixture_name` is resolved against `location`. A name without an
/// extension falls back to `<name>.json` when the bare file does not exist.
pub fn load_fixture(fixture_name: &str, location: &Path) -> Result<Value, FixtureError> {
    let path = resolve_fixture(fixture_name, location);
    let bytes = std::fs::read(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            FixtureError::NotFound { path: path.clone() }
        } else {
            FixtureError::Read {
                path: path.clone(),
                source,
            }
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|source| FixtureError::Parse { path, source })
}

fn resolve_fixture(fixture_name: &str, location: &Path) -> PathBuf {
    let direct = location.join(fixture_name);
    if direct.is_file() || Path::new(fixture_name).extension().is_some() {
        return direct;
    }
    location.join(format!("{fixture_name}.json"))
}
