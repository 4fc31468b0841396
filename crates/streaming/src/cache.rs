use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use foundation::ids::Side;
use foundation::time::TimeOffset;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::backend::{Backend, BackendError};
use crate::protocol::{LinePayload, NetworkPayload, QueryParams};

/// Whether the side a payload was requested for is part of its cache key.
///
/// The backend result depends only on the time offset and the query
/// parameters, so sharing across sides is the default: the t1 graph of one
/// step is the t0 graph of a later step.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    #[default]
    SharedAcrossSides,
    PerSide,
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::SharedAcrossSides => f.write_str("shared-across-sides"),
            CachePolicy::PerSide => f.write_str("per-side"),
        }
    }
}

impl FromStr for CachePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" | "shared-across-sides" => Ok(CachePolicy::SharedAcrossSides),
            "per-side" => Ok(CachePolicy::PerSide),
            other => Err(format!("unknown cache policy: {other}")),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Network,
    Lines,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    pub resource: Resource,
    pub time_offset: TimeOffset,
    pub side: Option<Side>,
    pub params: QueryParams,
}

type Slot<T> = Arc<OnceCell<Arc<T>>>;

/// Session-lifetime memoization of backend payloads.
///
/// - The first request for a key fetches; later ones get the same `Arc`.
/// - Concurrent requests for one key share a single fetch.
/// - A failed fetch stores nothing, so the next request retries.
/// - No eviction or invalidation.
///
/// Contingency tables are fetched per query and never cached.
pub struct DataCache {
    backend: Arc<dyn Backend>,
    policy: CachePolicy,
    networks: Mutex<BTreeMap<CacheKey, Slot<NetworkPayload>>>,
    lines: Mutex<BTreeMap<CacheKey, Slot<Vec<LinePayload>>>>,
}

impl DataCache {
    pub fn new(backend: Arc<dyn Backend>, policy: CachePolicy) -> Self {
        Self {
            backend,
            policy,
            networks: Mutex::new(BTreeMap::new()),
            lines: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn key(
        &self,
        resource: Resource,
        time_offset: TimeOffset,
        side: Side,
        params: &QueryParams,
    ) -> CacheKey {
        CacheKey {
            resource,
            time_offset,
            side: match self.policy {
                CachePolicy::SharedAcrossSides => None,
                CachePolicy::PerSide => Some(side),
            },
            params: params.clone(),
        }
    }

    pub async fn network(
        &self,
        time_offset: TimeOffset,
        side: Side,
        params: &QueryParams,
    ) -> Result<Arc<NetworkPayload>, BackendError> {
        let key = self.key(Resource::Network, time_offset, side, params);
        let slot = slot_for(&self.networks, &key);
        get_or_fetch(&slot, &key, || self.backend.get_network(time_offset, params)).await
    }

    pub async fn lines(
        &self,
        time_offset: TimeOffset,
        side: Side,
        params: &QueryParams,
    ) -> Result<Arc<Vec<LinePayload>>, BackendError> {
        let key = self.key(Resource::Lines, time_offset, side, params);
        let slot = slot_for(&self.lines, &key);
        get_or_fetch(&slot, &key, || self.backend.get_lines(time_offset, params)).await
    }

    pub async fn contingency_table(
        &self,
        t0: TimeOffset,
        params: &QueryParams,
    ) -> Result<Vec<Vec<u64>>, BackendError> {
        self.backend.get_contingency_table(t0, params).await
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        count_filled(&self.networks.lock()) + count_filled(&self.lines.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn slot_for<T>(slots: &Mutex<BTreeMap<CacheKey, Slot<T>>>, key: &CacheKey) -> Slot<T> {
    slots.lock().entry(key.clone()).or_default().clone()
}

fn count_filled<T>(slots: &BTreeMap<CacheKey, Slot<T>>) -> usize {
    slots.values().filter(|s| s.initialized()).count()
}

async fn get_or_fetch<T, F, Fut>(
    slot: &OnceCell<Arc<T>>,
    key: &CacheKey,
    fetch: F,
) -> Result<Arc<T>, BackendError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, BackendError>>,
{
    if let Some(hit) = slot.get() {
        debug!(?key, "cache hit");
        return Ok(Arc::clone(hit));
    }
    let value = slot
        .get_or_try_init(|| async {
            info!(resource = ?key.resource, offset = %key.time_offset, "fetching from backend");
            fetch().await.map(Arc::new)
        })
        .await?;
    Ok(Arc::clone(value))
}
