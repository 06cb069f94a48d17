mod helpers;
mod middleware;
mod password;

pub use helpers::{extract_bearer_token, validate_session};
pub use middleware::{AuthError, RequireSession};
pub use password::PasswordHasher;
