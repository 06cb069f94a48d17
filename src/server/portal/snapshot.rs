use std::sync::Arc;

use axum::{Json, extract::State};

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::StatsResponse;
use crate::server::extract::JsonObject;
use crate::server::response::{ApiError, StoreResultExt};
use crate::types::{PortalImport, PortalSnapshot, Stats};

pub async fn get_portal(
    _session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortalSnapshot>, ApiError> {
    let snapshot = state
        .store
        .portal_snapshot()
        .api_err("Failed to load portal")?;

    Ok(Json(snapshot))
}

/// Replaces every collection and all stats in one transaction.
pub async fn replace_portal(
    RequireSession(session): RequireSession,
    State(state): State<Arc<AppState>>,
    JsonObject(body): JsonObject,
) -> Result<Json<PortalSnapshot>, ApiError> {
    let import = PortalImport::from_json(&body);

    let snapshot = state
        .store
        .replace_portal_data(&import)
        .api_err("Failed to replace portal data")?;

    tracing::info!(
        "Portal data replaced by {} ({} cases, {} clients, {} tasks)",
        session.email,
        snapshot.cases.len(),
        snapshot.clients.len(),
        snapshot.tasks.len()
    );

    Ok(Json(snapshot))
}

/// Applies only the recognized stat keys present in the body.
pub async fn update_stats(
    _session: RequireSession,
    State(state): State<Arc<AppState>>,
    JsonObject(body): JsonObject,
) -> Result<Json<StatsResponse>, ApiError> {
    let updates = Stats::partial_from_json(&body);

    let stats = state
        .store
        .update_stats(&updates)
        .api_err("Failed to update stats")?;

    Ok(Json(StatsResponse { stats }))
}
