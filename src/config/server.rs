use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_SESSION_TTL_HOURS: f64 = 24.0;
/// Ten years. Longer lifetimes fall back to the default.
pub const MAX_SESSION_TTL_HOURS: f64 = 87_600.0;
pub const DEFAULT_DATABASE_FILENAME: &str = "lawdesk.db";
const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. A single `*` entry allows any origin.
    pub allowed_origins: Vec<String>,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
    pub session_ttl_hours: f64,
    pub database_path: PathBuf,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Unset, blank or
    /// unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let allowed_origins = get("CLIENT_ORIGIN")
            .map(|v| parse_origins(&v))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        let session_ttl_hours = get("SESSION_TTL_HOURS")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|hours| (0.0..=MAX_SESSION_TTL_HOURS).contains(hours))
            .unwrap_or(defaults.session_ttl_hours);

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            allowed_origins,
            admin_email: get("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password: get("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            admin_name: get("ADMIN_NAME").unwrap_or(defaults.admin_name),
            session_ttl_hours,
            database_path: get("DATABASE_PATH")
                .map(|v| resolve_database_path(&v))
                .unwrap_or(defaults.database_path),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid HOST {:?}: {e}", self.host)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_CLIENT_ORIGIN.to_string()],
            admin_email: "admin@lawdesk.local".to_string(),
            admin_password: "changeMe123".to_string(),
            admin_name: "Portal Admin".to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            database_path: PathBuf::from("./data").join(DEFAULT_DATABASE_FILENAME),
        }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().trim_end_matches('/'))
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// A path ending in a separator names a directory; the default file name is
/// appended to it.
#[must_use]
pub fn resolve_database_path(value: &str) -> PathBuf {
    if value.ends_with('/') || value.ends_with('\\') {
        PathBuf::from(value).join(DEFAULT_DATABASE_FILENAME)
    } else {
        PathBuf::from(value)
    }
}
