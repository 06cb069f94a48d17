use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::helpers::{extract_bearer_token, validate_session};
use crate::server::AppState;
use crate::types::SessionUser;

/// Extractor that requires a live bearer session.
pub struct RequireSession(pub SessionUser);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidSession,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required."),
            AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "Session expired or invalid."),
            AuthError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred.",
            ),
        };

        let mut response = (status, Json(json!({ "message": message }))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"lawdesk\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or(AuthError::MissingAuth)?;

        let session = validate_session(state, token)
            .map_err(|e| {
                tracing::error!("Session lookup failed: {e}");
                AuthError::InternalError
            })?
            .ok_or(AuthError::InvalidSession)?;

        Ok(RequireSession(session))
    }
}
