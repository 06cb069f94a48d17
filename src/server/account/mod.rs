mod sessions;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn account_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(sessions::login))
        .route("/auth/register", post(sessions::register))
        .route("/auth/logout", post(sessions::logout))
        .route("/auth/session", get(sessions::current_session))
}
