//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a JWT Bearer token.
//! - [`rbac::RequireEditor`] -- Requires the `editor` or `admin` role.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rate_limit::LoginThrottle`] -- Per-client login attempt budget.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
