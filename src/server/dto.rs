use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{Fields, Stats, UserProfile};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Login body. Passwords are taken verbatim, never trimmed.
#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// None when either field is missing or blank.
    #[must_use]
    pub fn from_json(map: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            email: Fields::new(map).optional(&["email"])?,
            password: password_field(map)?,
        })
    }
}

#[derive(Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn from_json(map: &Map<String, Value>) -> Result<Self, &'static str> {
        let fields = Fields::new(map);
        let (Some(name), Some(email), Some(password)) = (
            fields.optional(&["name"]),
            fields.optional(&["email"]),
            password_field(map),
        ) else {
            return Err("Name, email, and password are required.");
        };

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 8 characters long.");
        }

        Ok(Self {
            name,
            email,
            password,
        })
    }
}

fn password_field(map: &Map<String, Value>) -> Option<String> {
    map.get("password")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: Stats,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert!(LoginRequest::from_json(&object(json!({"email": "a@x.com"}))).is_none());
        assert!(LoginRequest::from_json(&object(json!({"password": "pw"}))).is_none());

        let req =
            LoginRequest::from_json(&object(json!({"email": " a@x.com ", "password": " pw "})))
                .unwrap();
        assert_eq!(req.email, "a@x.com");
        assert_eq!(req.password, " pw ");
    }

    #[test]
    fn test_register_validation() {
        let missing = RegisterRequest::from_json(&object(json!({"email": "a@x.com", "password": "longenough1"})));
        assert_eq!(missing.unwrap_err(), "Name, email, and password are required.");

        let short = RegisterRequest::from_json(&object(
            json!({"name": "A", "email": "a@x.com", "password": "short"}),
        ));
        assert_eq!(short.unwrap_err(), "Password must be at least 8 characters long.");

        let ok = RegisterRequest::from_json(&object(
            json!({"name": "A", "email": "a@x.com", "password": "longenough1"}),
        ))
        .unwrap();
        assert_eq!(ok.name, "A");
    }
}
