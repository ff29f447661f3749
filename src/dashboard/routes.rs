//! HTTP endpoints for the dashboard.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;

use super::response::{CardQuery, DashboardResponse};
use super::snapshot::SnapshotStore;
use crate::config::BoardLimits;
use crate::stickers::StickerCatalog;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub catalog: Arc<StickerCatalog>,
    pub limits: BoardLimits,
    pub support_kinds: Arc<[String]>,
}

/// Build the Axum router with the dashboard routes.
pub fn dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/state", get(dashboard))
        .route("/health-check", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "OK" }))
}

async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let snapshot = state.store.load().await;
    let query = CardQuery::from_pairs(pairs);
    let etag = query.etag(snapshot.etag);

    let cached = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag);
    if cached {
        debug!(etag = %etag, "Dashboard not modified");
        return StatusCode::NOT_MODIFIED.into_response();
    }

    let body = DashboardResponse::build(
        &snapshot,
        &query,
        &state.catalog,
        state.limits,
        &state.support_kinds,
    );

    ([(header::ETAG, etag)], Json(body)).into_response()
}
