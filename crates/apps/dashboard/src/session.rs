//! One dashboard session: data cache, time-step navigation and the
//! coordinator of the currently shown step.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use foundation::ids::{AxisLabel, NodeId, Side, SidePair};
use foundation::math::{Vec2, Viewport};
use foundation::time::TimeOffset;
use parking_lot::Mutex;
use runtime::{Controls, Direction, NavigationError, Navigator};
use scene::views::RegionPick;
use scene::{Coordinator, MountNames, SelectError, Snapshot, StepData, ViewMounts};
use serde::Serialize;
use streaming::{BackendError, DataCache, LinePayload, NetworkPayload, QueryParams};
use tracing::{info, warn};

#[derive(Debug)]
pub enum SessionError {
    Navigation(NavigationError),
    Backend(BackendError),
    Malformed(matching::MatrixError),
    Select(SelectError),
    NotLoaded,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Navigation(e) => write!(f, "{e}"),
            SessionError::Backend(e) => write!(f, "backend request failed: {e}"),
            SessionError::Malformed(e) => write!(f, "malformed backend payload: {e}"),
            SessionError::Select(e) => write!(f, "{e}"),
            SessionError::NotLoaded => write!(f, "no time step loaded yet"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Navigation(e) => Some(e),
            SessionError::Backend(e) => Some(e),
            SessionError::Malformed(e) => Some(e),
            SessionError::Select(e) => Some(e),
            SessionError::NotLoaded => None,
        }
    }
}

impl From<NavigationError> for SessionError {
    fn from(e: NavigationError) -> Self {
        SessionError::Navigation(e)
    }
}

impl From<BackendError> for SessionError {
    fn from(e: BackendError) -> Self {
        SessionError::Backend(e)
    }
}

impl From<matching::MatrixError> for SessionError {
    fn from(e: matching::MatrixError) -> Self {
        SessionError::Malformed(e)
    }
}

impl From<SelectError> for SessionError {
    fn from(e: SelectError) -> Self {
        SessionError::Select(e)
    }
}

struct SessionState {
    navigator: Navigator,
    mounts: ViewMounts,
    data: Option<StepData>,
    coordinator: Option<Coordinator>,
    last_error: Option<String>,
}

/// What `GET /api/state` reports.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub current: TimeOffset,
    pub paired: TimeOffset,
    pub in_flight: Option<TimeOffset>,
    pub controls: Controls,
    pub last_error: Option<String>,
    pub view: Option<Snapshot>,
}

pub struct Session {
    cache: DataCache,
    params: QueryParams,
    mount_names: MountNames,
    state: Mutex<SessionState>,
}

/// Clears the in-flight marker if a query future is dropped before it
/// completes.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("query abandoned before completion");
            self.state.lock().navigator.finish(false);
        }
    }
}

impl Session {
    pub fn new(
        cache: DataCache,
        params: QueryParams,
        start: TimeOffset,
        mount_names: MountNames,
    ) -> Self {
        Self {
            cache,
            params,
            mount_names,
            state: Mutex::new(SessionState {
                navigator: Navigator::new(start),
                mounts: ViewMounts::all(),
                data: None,
                coordinator: None,
                last_error: None,
            }),
        }
    }

    /// Reloads the current step.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let t0 = self.state.lock().navigator.begin_refresh()?;
        self.run(t0).await
    }

    pub async fn navigate(&self, direction: Direction) -> Result<(), SessionError> {
        let t0 = self.state.lock().navigator.begin_step(direction)?;
        self.run(t0).await
    }

    async fn run(&self, t0: TimeOffset) -> Result<(), SessionError> {
        let mut guard = InFlight {
            state: &self.state,
            armed: true,
        };
        let loaded = self.load(t0).await;
        guard.armed = false;

        let mut state = self.state.lock();
        let outcome = loaded.and_then(|data| {
            let coordinator = Coordinator::build(&data, state.mounts.clone())?;
            Ok((data, coordinator))
        });
        match outcome {
            Ok((data, coordinator)) => {
                state.data = Some(data);
                state.coordinator = Some(coordinator);
                state.last_error = None;
                state.navigator.finish(true);
                info!(%t0, "time step loaded");
                Ok(())
            }
            Err(err) => {
                warn!(%t0, "query failed: {err}");
                state.last_error = Some(err.to_string());
                state.navigator.finish(false);
                Err(err)
            }
        }
    }

    async fn load(&self, t0: TimeOffset) -> Result<StepData, SessionError> {
        let t1 = t0.paired();
        let (left, right) = tokio::try_join!(
            self.load_side(t0, Side::Left),
            self.load_side(t1, Side::Right)
        )?;
        let table = self.cache.contingency_table(t0, &self.params).await?;
        Ok(StepData {
            t0,
            networks: SidePair::new(left.0, right.0),
            lines: SidePair::new(left.1, right.1),
            table,
        })
    }

    async fn load_side(
        &self,
        offset: TimeOffset,
        side: Side,
    ) -> Result<(Arc<NetworkPayload>, Arc<Vec<LinePayload>>), BackendError> {
        tokio::try_join!(
            self.cache.network(offset, side, &self.params),
            self.cache.lines(offset, side, &self.params)
        )
    }

    /// Re-attaches views against the containers that exist, rebuilding the
    /// coordinator of the loaded step.
    pub fn set_mounts(&self, available: &BTreeSet<String>) -> Result<(), SessionError> {
        let mounts = ViewMounts::attach(&self.mount_names, available);
        let mut state = self.state.lock();
        if let Some(data) = &state.data {
            let coordinator = Coordinator::build(data, mounts.clone())?;
            state.coordinator = Some(coordinator);
        }
        state.mounts = mounts;
        Ok(())
    }

    pub fn select_cell(&self, old: AxisLabel, new: AxisLabel) -> Result<(), SessionError> {
        self.with_coordinator(|c| c.select_cell(old, new))
    }

    pub fn click_cell(&self, x: usize, y: usize) -> Result<(), SessionError> {
        self.with_coordinator(|c| c.click_cell(x, y))
    }

    pub fn select_node(&self, side: Side, node: NodeId) -> Result<(), SessionError> {
        self.with_coordinator(|c| c.select_node(side, node))
    }

    pub fn select_region(
        &self,
        side: Side,
        polygon: Vec<Vec2>,
        viewport: &Viewport,
    ) -> Result<RegionPick, SessionError> {
        self.with_coordinator(|c| c.select_region(side, polygon, viewport))
    }

    pub fn reset(&self) -> Result<(), SessionError> {
        self.with_coordinator(|c| {
            c.clear();
            Ok(())
        })
    }

    pub fn view(&self) -> SessionView {
        let state = self.state.lock();
        let current = state.navigator.current();
        SessionView {
            current,
            paired: current.paired(),
            in_flight: state.navigator.in_flight(),
            controls: state.navigator.controls(),
            last_error: state.last_error.clone(),
            view: state.coordinator.as_ref().map(Coordinator::snapshot),
        }
    }

    fn with_coordinator<T>(
        &self,
        f: impl FnOnce(&mut Coordinator) -> Result<T, SelectError>,
    ) -> Result<T, SessionError> {
        let mut state = self.state.lock();
        let coordinator = state.coordinator.as_mut().ok_or(SessionError::NotLoaded)?;
        Ok(f(coordinator)?)
    }
}
