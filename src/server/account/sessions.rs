use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::{AuthResponse, LoginRequest, RegisterRequest, SessionResponse};
use crate::server::extract::JsonObject;
use crate::server::response::{ApiError, StoreResultExt};
use crate::types::{User, UserProfile};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

fn start_session(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let session = state
        .store
        .create_session(user.id, state.session_ttl_hours)
        .api_err("Failed to create session")?;

    Ok(AuthResponse {
        token: session.token,
        user: UserProfile::from(user),
        expires_at: session.expires_at,
    })
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonObject(body): JsonObject,
) -> Result<Json<AuthResponse>, ApiError> {
    let req = LoginRequest::from_json(&body)
        .ok_or_else(|| ApiError::bad_request("Email and password are required."))?;

    let user = state
        .store
        .get_user_by_email(&req.email)
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if !state.passwords.verify(&user.password_hash, &req.password) {
        tracing::debug!("Rejected login for {}", user.email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    Ok(Json(start_session(&state, &user)?))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let req = RegisterRequest::from_json(&body).map_err(ApiError::bad_request)?;

    let password_hash = state
        .passwords
        .hash(&req.password)
        .api_err("Failed to hash password")?;

    let user = state
        .store
        .create_user(&req.email, &req.name, &password_hash)
        .api_err("Failed to create user")?;

    tracing::info!("Registered user {} ({})", user.id, user.email);

    Ok((StatusCode::CREATED, Json(start_session(&state, &user)?)))
}

pub async fn logout(
    RequireSession(session): RequireSession,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_session(&session.token)
        .api_err("Failed to delete session")?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_session(RequireSession(session): RequireSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: session.profile(),
        token: session.token,
    })
}
