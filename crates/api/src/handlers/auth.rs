//! Handlers for the `/auth` resource.
//!
//! There are no user accounts. Two shared passwords live in `settings`: the
//! public one grants the editor role, the admin one grants the admin role.

use axum::extract::State;
use axum::Json;
use eventplan_core::error::CoreError;
use eventplan_core::roles::Role;
use eventplan_db::models::setting::{KEY_ADMIN_PASSWORD, KEY_PUBLIC_PASSWORD};
use eventplan_db::repositories::SettingRepo;
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rate_limit::LoginThrottle;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for both login endpoints.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
}

/// Response for `GET /auth/check`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Exchange the public password for an editor token. Throttled per client.
pub async fn login(
    _throttle: LoginThrottle,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let response = login_with(&state, KEY_PUBLIC_PASSWORD, Role::Editor, &input).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/auth/admin/login
///
/// Exchange the admin password for an admin token.
pub async fn admin_login(
    _throttle: LoginThrottle,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let response = login_with(&state, KEY_ADMIN_PASSWORD, Role::Admin, &input).await?;
    Ok(Json(DataResponse { data: response }))
}

/// GET /api/v1/auth/check
///
/// Report whether the bearer token is valid and which role it carries.
pub async fn check(user: AuthUser) -> Json<DataResponse<SessionInfo>> {
    Json(DataResponse {
        data: SessionInfo {
            authenticated: true,
            role: user.role,
        },
    })
}

async fn login_with(
    state: &AppState,
    key: &str,
    role: Role,
    input: &LoginRequest,
) -> AppResult<LoginResponse> {
    let stored_hash = SettingRepo::get(&state.pool, key)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("System not configured: {key} is missing")))?;

    let valid = verify_password(&input.password, &stored_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::info!(%role, "Rejected login attempt");
        return Err(AppError::Core(CoreError::Unauthorized("Invalid password".into())));
    }

    let access_token = state
        .config
        .jwt
        .issue(role)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(%role, "Login succeeded");
    Ok(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        role,
    })
}
