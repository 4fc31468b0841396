//! Backend abstraction for the clustering service.
//!
//! `HttpBackend` talks to the remote service; `MemoryBackend` serves fixed
//! payloads and counts calls, for tests and offline runs.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use foundation::time::TimeOffset;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::protocol::{LinePayload, NetworkPayload, QueryParams};

#[derive(Debug)]
pub struct BackendError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of per-time-step clustering results.
///
/// Methods return boxed futures so the trait stays dyn-compatible.
pub trait Backend: Send + Sync {
    fn get_network<'a>(
        &'a self,
        offset: TimeOffset,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<NetworkPayload, BackendError>>;

    fn get_lines<'a>(
        &'a self,
        offset: TimeOffset,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<Vec<LinePayload>, BackendError>>;

    /// Transition counts from `t0` to its paired step.
    fn get_contingency_table<'a>(
        &'a self,
        t0: TimeOffset,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<Vec<Vec<u64>>, BackendError>>;
}

/// JSON-over-HTTP backend.
///
/// Endpoints (`GET`, relative to the base URL): `/network`, `/lines` and
/// `/contingency-table`, with the query parameters as a query string.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path);
        debug!(%url, "backend request");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| BackendError::with_source(format!("request to {url} failed"), e))?;

        if !resp.status().is_success() {
            return Err(BackendError::new(format!(
                "backend returned {} for {url}",
                resp.status()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| BackendError::with_source(format!("invalid payload from {url}"), e))
    }
}

fn full_query(offset: TimeOffset, params: &QueryParams) -> Vec<(&'static str, String)> {
    vec![
        ("sim_start", params.sim_start.clone()),
        ("time_offset", offset.hours().to_string()),
        ("dist_threshold", params.dist_threshold.to_string()),
        ("required_ratio", params.required_ratio.0.to_string()),
        ("line_type", params.line_type.to_string()),
    ]
}

impl Backend for HttpBackend {
    fn get_network<'a>(
        &'a self,
        offset: TimeOffset,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<NetworkPayload, BackendError>> {
        Box::pin(async move { self.fetch_json("network", &full_query(offset, params)).await })
    }

    fn get_lines<'a>(
        &'a self,
        offset: TimeOffset,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<Vec<LinePayload>, BackendError>> {
        let query = vec![
            ("sim_start", params.sim_start.clone()),
            ("time_offset", offset.hours().to_string()),
            ("line_type", params.line_type.to_string()),
        ];
        Box::pin(async move { self.fetch_json("lines", &query).await })
    }

    fn get_contingency_table<'a>(
        &'a self,
        t0: TimeOffset,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<Vec<Vec<u64>>, BackendError>> {
        Box::pin(async move {
            self.fetch_json("contingency-table", &full_query(t0, params))
                .await
        })
    }
}

/// Per-method call counts of a [`MemoryBackend`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub network: usize,
    pub lines: usize,
    pub contingency: usize,
}

/// In-memory backend keyed by time offset. Query parameters are ignored.
#[derive(Default)]
pub struct MemoryBackend {
    networks: Mutex<BTreeMap<TimeOffset, NetworkPayload>>,
    lines: Mutex<BTreeMap<TimeOffset, Vec<LinePayload>>>,
    tables: Mutex<BTreeMap<TimeOffset, Vec<Vec<u64>>>>,
    failing: AtomicBool,
    network_calls: AtomicUsize,
    line_calls: AtomicUsize,
    contingency_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_network(&self, offset: TimeOffset, payload: NetworkPayload) {
        self.networks.lock().insert(offset, payload);
    }

    pub fn insert_lines(&self, offset: TimeOffset, lines: Vec<LinePayload>) {
        self.lines.lock().insert(offset, lines);
    }

    pub fn insert_table(&self, t0: TimeOffset, table: Vec<Vec<u64>>) {
        self.tables.lock().insert(t0, table);
    }

    /// While set, every call fails.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            network: self.network_calls.load(Ordering::SeqCst),
            lines: self.line_calls.load(Ordering::SeqCst),
            contingency: self.contingency_calls.load(Ordering::SeqCst),
        }
    }

    async fn serve<T: Clone>(
        &self,
        counter: &AtomicUsize,
        store: &Mutex<BTreeMap<TimeOffset, T>>,
        offset: TimeOffset,
        what: &str,
    ) -> Result<T, BackendError> {
        counter.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers interleave like a real request would.
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::new(format!("{what} unavailable for {offset}")));
        }
        store
            .lock()
            .get(&offset)
            .cloned()
            .ok_or_else(|| BackendError::new(format!("no {what} for {offset}")))
    }
}

impl Backend for MemoryBackend {
    fn get_network<'a>(
        &'a self,
        offset: TimeOffset,
        _params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<NetworkPayload, BackendError>> {
        Box::pin(self.serve(&self.network_calls, &self.networks, offset, "network"))
    }

    fn get_lines<'a>(
        &'a self,
        offset: TimeOffset,
        _params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<Vec<LinePayload>, BackendError>> {
        Box::pin(self.serve(&self.line_calls, &self.lines, offset, "lines"))
    }

    fn get_contingency_table<'a>(
        &'a self,
        t0: TimeOffset,
        _params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<Vec<Vec<u64>>, BackendError>> {
        Box::pin(self.serve(
            &self.contingency_calls,
            &self.tables,
            t0,
            "contingency table",
        ))
    }
}
