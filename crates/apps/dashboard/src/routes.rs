use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Path as AxumPath, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use foundation::ids::{AxisLabel, NodeId, Side};
use foundation::math::{Vec2, Viewport};
use runtime::{Direction, NavigationError};
use scene::views::RegionPick;
use scene::SelectError;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::session::{Session, SessionError, SessionView};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

fn status_of(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Navigation(NavigationError::Busy { .. }) => StatusCode::CONFLICT,
        SessionError::Navigation(NavigationError::AtBoundary(_)) => StatusCode::BAD_REQUEST,
        SessionError::Backend(_) | SessionError::Malformed(_) => StatusCode::BAD_GATEWAY,
        SessionError::Select(SelectError::UnknownLabel(_))
        | SessionError::Select(SelectError::UnknownNode { .. })
        | SessionError::Select(SelectError::NoCell { .. }) => StatusCode::NOT_FOUND,
        SessionError::Select(SelectError::Detached(_)) => StatusCode::CONFLICT,
        SessionError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn reject(err: SessionError) -> (StatusCode, Json<Value>) {
    let status = status_of(&err);
    if status.is_server_error() {
        warn!("request failed: {err}");
    }
    api_error(status, err.to_string())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/state", get(get_state))
        .route("/api/refresh", post(refresh))
        .route("/api/navigate/:direction", post(navigate))
        .route("/api/mounts", post(set_mounts))
        .route("/api/select/cell", post(select_cell))
        .route("/api/select/node", post(select_node))
        .route("/api/select/region", post(select_region))
        .route("/api/reset", post(reset))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_state(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.view())
}

async fn refresh(State(state): State<AppState>) -> ApiResult<SessionView> {
    state.session.refresh().await.map_err(reject)?;
    Ok(Json(state.session.view()))
}

async fn navigate(
    State(state): State<AppState>,
    AxumPath(direction): AxumPath<Direction>,
) -> ApiResult<SessionView> {
    state.session.navigate(direction).await.map_err(reject)?;
    Ok(Json(state.session.view()))
}

#[derive(Debug, Deserialize)]
struct MountsRequest {
    available: BTreeSet<String>,
}

async fn set_mounts(
    State(state): State<AppState>,
    Json(req): Json<MountsRequest>,
) -> ApiResult<SessionView> {
    state.session.set_mounts(&req.available).map_err(reject)?;
    Ok(Json(state.session.view()))
}

/// A cell named by its axis labels, or by its drawn position in the table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellRequest {
    Labels { old: AxisLabel, new: AxisLabel },
    Position { x: usize, y: usize },
}

async fn select_cell(
    State(state): State<AppState>,
    Json(req): Json<CellRequest>,
) -> ApiResult<SessionView> {
    let selected = match req {
        CellRequest::Labels { old, new } => state.session.select_cell(old, new),
        CellRequest::Position { x, y } => state.session.click_cell(x, y),
    };
    selected.map_err(reject)?;
    Ok(Json(state.session.view()))
}

#[derive(Debug, Deserialize)]
struct NodeRequest {
    side: Side,
    node: NodeId,
}

async fn select_node(
    State(state): State<AppState>,
    Json(req): Json<NodeRequest>,
) -> ApiResult<SessionView> {
    state
        .session
        .select_node(req.side, req.node)
        .map_err(reject)?;
    Ok(Json(state.session.view()))
}

/// A lasso drawn on one map, in container pixels under `viewport`.
#[derive(Debug, Deserialize)]
struct RegionRequest {
    side: Side,
    polygon: Vec<Vec2>,
    viewport: Viewport,
}

async fn select_region(
    State(state): State<AppState>,
    Json(req): Json<RegionRequest>,
) -> ApiResult<RegionPick> {
    let pick = state
        .session
        .select_region(req.side, req.polygon, &req.viewport)
        .map_err(reject)?;
    Ok(Json(pick))
}

async fn reset(State(state): State<AppState>) -> ApiResult<SessionView> {
    state.session.reset().map_err(reject)?;
    Ok(Json(state.session.view()))
}
