use std::sync::Arc;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::LoginRateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the config sits
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: eventplan_db::DbPool,
    /// Server configuration (JWT settings, upload directory, limits).
    pub config: Arc<ServerConfig>,
    /// Login attempt counters shared by both login endpoints.
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    pub fn new(pool: eventplan_db::DbPool, config: ServerConfig) -> Self {
        let login_limiter = Arc::new(LoginRateLimiter::new(config.login_attempts_per_minute));
        Self {
            pool,
            config: Arc::new(config),
            login_limiter,
        }
    }
}
