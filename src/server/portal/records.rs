use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::auth::RequireSession;
use crate::error::Result;
use crate::server::AppState;
use crate::server::extract::JsonObject;
use crate::server::response::{ApiError, StoreResultExt};
use crate::store::Store;
use crate::types::{
    Case, Client, PortalRecord, Resource, SupportDesk, Task, TeamMember, now,
};

/// A record type served as a REST collection.
pub trait Collection: PortalRecord + Serialize + Send + 'static {
    fn create(store: &dyn Store, record: Self) -> Result<Self>;
    fn list(store: &dyn Store) -> Result<Vec<Self>>;
    fn delete(store: &dyn Store, id: &str) -> Result<bool>;
}

macro_rules! collection {
    ($ty:ty, $create:ident, $list:ident, $delete:ident) => {
        impl Collection for $ty {
            fn create(store: &dyn Store, record: Self) -> Result<Self> {
                store.$create(record)
            }

            fn list(store: &dyn Store) -> Result<Vec<Self>> {
                store.$list()
            }

            fn delete(store: &dyn Store, id: &str) -> Result<bool> {
                store.$delete(id)
            }
        }
    };
}

collection!(Case, create_case, list_cases, delete_case);
collection!(Client, create_client, list_clients, delete_client);
collection!(Task, create_task, list_tasks, delete_task);
collection!(TeamMember, create_team_member, list_team_members, delete_team_member);
collection!(Resource, create_resource, list_resources, delete_resource);
collection!(SupportDesk, create_support_desk, list_support_desks, delete_support_desk);

pub async fn list_records<R: Collection>(
    _session: RequireSession,
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<Vec<R>>, ApiError> {
    let records = R::list(state.store.as_ref()).api_err("Failed to list records")?;
    Ok(Json(records))
}

pub async fn create_record<R: Collection>(
    _session: RequireSession,
    State(state): State<Arc<AppState>>,
    JsonObject(body): JsonObject,
) -> std::result::Result<(StatusCode, Json<R>), ApiError> {
    let record = R::from_json(&body, now());
    if !record.has_required_fields() {
        return Err(ApiError::bad_request(R::REQUIRED_MESSAGE));
    }

    let created = R::create(state.store.as_ref(), record).api_err("Failed to create record")?;
    tracing::info!("Created {} {}", R::KIND, created.id());

    Ok((StatusCode::CREATED, Json(created)))
}

/// Deleting an id that does not exist still answers 204.
pub async fn delete_record<R: Collection>(
    _session: RequireSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
    if R::delete(state.store.as_ref(), &id).api_err("Failed to delete record")? {
        tracing::info!("Deleted {} {id}", R::KIND);
    }

    Ok(StatusCode::NO_CONTENT)
}
