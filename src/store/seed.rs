use super::Store;
use crate::auth::PasswordHasher;
use crate::config::ServerConfig;
use crate::error::{Error, Result};

/// Ensures the stat keys and the configured admin user exist. Safe to run on
/// every start.
pub fn seed_defaults(
    store: &dyn Store,
    config: &ServerConfig,
    passwords: &PasswordHasher,
) -> Result<()> {
    store.ensure_stats()?;

    if store.get_user_by_email(&config.admin_email)?.is_some() {
        return Ok(());
    }

    let hash = passwords.hash(&config.admin_password)?;
    match store.create_user(&config.admin_email, &config.admin_name, &hash) {
        Ok(user) => {
            tracing::info!("Created admin user {}", user.email);
            Ok(())
        }
        // Another process seeded it between the lookup and the insert
        Err(Error::AlreadyExists) => Ok(()),
        Err(e) => Err(e),
    }
}
