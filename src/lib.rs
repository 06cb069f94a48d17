//! # Lawdesk
//!
//! A case and client management API for small law firms, usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lawdesk::auth::PasswordHasher;
//! use lawdesk::config::ServerConfig;
//! use lawdesk::server::{AppState, create_router};
//! use lawdesk::store::{SqliteStore, Store, seed_defaults};
//!
//! let config = ServerConfig::default();
//! let store = SqliteStore::new(&config.database_path).unwrap();
//! store.initialize().unwrap();
//!
//! let passwords = PasswordHasher::new();
//! seed_defaults(&store, &config, &passwords).unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), passwords, &config));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): builds the `lawdesk` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
