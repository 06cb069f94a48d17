mod records;
mod snapshot;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, put},
};

use crate::server::AppState;
use crate::types::{Case, Client, Resource, SupportDesk, Task, TeamMember};

pub use records::Collection;

pub fn portal_router() -> Router<Arc<AppState>> {
    Router::new()
        // Whole-portal routes
        .route(
            "/portal",
            get(snapshot::get_portal).put(snapshot::replace_portal),
        )
        .route("/portal/stats", put(snapshot::update_stats))
        // Collection routes
        .route(
            "/cases",
            get(records::list_records::<Case>).post(records::create_record::<Case>),
        )
        .route("/cases/{id}", delete(records::delete_record::<Case>))
        .route(
            "/clients",
            get(records::list_records::<Client>).post(records::create_record::<Client>),
        )
        .route("/clients/{id}", delete(records::delete_record::<Client>))
        .route(
            "/tasks",
            get(records::list_records::<Task>).post(records::create_record::<Task>),
        )
        .route("/tasks/{id}", delete(records::delete_record::<Task>))
        .route(
            "/team",
            get(records::list_records::<TeamMember>)
                .post(records::create_record::<TeamMember>),
        )
        .route("/team/{id}", delete(records::delete_record::<TeamMember>))
        .route(
            "/resources",
            get(records::list_records::<Resource>).post(records::create_record::<Resource>),
        )
        .route(
            "/resources/{id}",
            delete(records::delete_record::<Resource>),
        )
        .route(
            "/support-desks",
            get(records::list_records::<SupportDesk>)
                .post(records::create_record::<SupportDesk>),
        )
        .route(
            "/support-desks/{id}",
            delete(records::delete_record::<SupportDesk>),
        )
}
