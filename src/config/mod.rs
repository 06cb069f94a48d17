mod server;

pub use server::{
    DEFAULT_DATABASE_FILENAME, DEFAULT_PORT, DEFAULT_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS,
    ServerConfig,
    resolve_database_path,
};
