use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};

use super::response::ApiError;

/// A request body read as a JSON object.
///
/// An empty body, or valid JSON that is not an object, yields an empty map so
/// that handlers answer with their own missing-field message. Invalid JSON is
/// a 400; body read failures keep their own status, such as 413.
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError {
                status: e.status(),
                message: e.body_text(),
            })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Map::new()));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|_| ApiError::bad_request("Request body must be valid JSON."))?;

        Ok(Self(match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }))
    }
}
