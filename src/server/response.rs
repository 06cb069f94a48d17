use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{Error, Result as StoreResult};

pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// API error that converts to a `{"message": ...}` response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(message) => Self::bad_request(message),
            Error::AlreadyExists => Self::conflict("A user with this email already exists."),
            other => {
                tracing::error!("Unhandled error: {other}");
                Self::internal()
            }
        }
    }
}

/// Extension trait for converting store results to API errors. Unexpected
/// failures are logged with `context` and answered with a generic 500.
pub trait StoreResultExt<T> {
    fn api_err(self, context: &str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| match e {
            Error::Validation(_) | Error::AlreadyExists => ApiError::from(e),
            other => {
                tracing::error!("{context}: {other}");
                ApiError::internal()
            }
        })
    }
}
