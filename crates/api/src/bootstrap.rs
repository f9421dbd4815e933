//! First-start seeding of the shared passwords.

use eventplan_db::models::setting::{KEY_ADMIN_PASSWORD, KEY_PUBLIC_PASSWORD};
use eventplan_db::repositories::SettingRepo;
use eventplan_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Store argon2 hashes of `INITIAL_PUBLIC_PASSWORD` / `INITIAL_ADMIN_PASSWORD`
/// for keys that have no value yet. Existing values are never overwritten.
pub async fn seed_passwords(pool: &DbPool, config: &ServerConfig) -> AppResult<()> {
    let seeds = [
        (KEY_PUBLIC_PASSWORD, config.initial_public_password.as_deref()),
        (KEY_ADMIN_PASSWORD, config.initial_admin_password.as_deref()),
    ];

    for (key, initial) in seeds {
        match initial {
            Some(password) => {
                let hash = hash_password(password)
                    .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
                if SettingRepo::insert_if_missing(pool, key, &hash).await? {
                    tracing::info!(key, "Seeded initial password");
                }
            }
            None => {
                if SettingRepo::get(pool, key).await?.is_none() {
                    tracing::warn!(key, "No password configured; login is disabled until one is set");
                }
            }
        }
    }
    Ok(())
}
