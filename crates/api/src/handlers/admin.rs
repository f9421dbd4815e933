//! Handlers for the `/admin` resource: event and category management and
//! password changes. Every handler requires the admin role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use eventplan_core::error::CoreError;
use eventplan_core::patch::PatchField;
use eventplan_core::types::DbId;
use eventplan_db::models::category::{Category, CategoryWithEvents, CreateCategory};
use eventplan_db::models::event::{CreateEvent, Event, EventWithRelations, UpdateEvent};
use eventplan_db::models::setting::{KEY_ADMIN_PASSWORD, KEY_PUBLIC_PASSWORD};
use eventplan_db::repositories::{CategoryRepo, EventRepo, PhotoRepo, ScheduleRepo, SettingRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::rbac::RequireAdmin;
use crate::photo_store;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for the password change endpoints.
#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

/// Confirmation message payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn ensure_category(pool: &PgPool, id: DbId) -> AppResult<Category> {
    CategoryRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/events
pub async fn list_events(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CategoryWithEvents>>>> {
    let groups = ScheduleRepo::all(&state.pool).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// POST /api/v1/admin/events
pub async fn create_event(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    let input = input.normalized()?;
    ensure_category(&state.pool, input.category_id).await?;

    let event = EventRepo::create(&state.pool, &input).await?;
    tracing::info!(event_id = event.id, category_id = event.category_id, "Event created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// PATCH|PUT /api/v1/admin/events/{id}
///
/// Partial update of every editable column. Omitted keys are left alone,
/// `null` clears optional columns and is rejected for `name`, `sort_order`
/// and `category_id`.
pub async fn update_event(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateEvent>,
) -> AppResult<Json<DataResponse<EventWithRelations>>> {
    let patch = input.normalized()?;
    if let PatchField::Value(category_id) = patch.category_id {
        ensure_category(&state.pool, category_id).await?;
    }

    let event = EventRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    if !patch.is_noop() {
        tracing::info!(event_id = id, "Event updated");
    }

    let event = ScheduleRepo::attach(&state.pool, vec![event])
        .await?
        .pop()
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/admin/events/{id}
///
/// Links and photo rows cascade; photo files are removed afterwards.
pub async fn delete_event(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let files = PhotoRepo::files_for_event(&state.pool, id).await?;
    if !EventRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Event", id }));
    }
    photo_store::delete_all(&state.config.upload, &files).await;

    tracing::info!(event_id = id, photos = files.len(), "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/categories
pub async fn create_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    let input = input.normalized()?;
    let category = CategoryRepo::create(&state.pool, &input).await?;
    tracing::info!(category_id = category.id, month = category.month, "Category created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// Cascades to events, links and photos; photo files are removed afterwards.
pub async fn delete_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let files = PhotoRepo::files_for_category(&state.pool, id).await?;
    if !CategoryRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }));
    }
    photo_store::delete_all(&state.config.upload, &files).await;

    tracing::info!(category_id = id, photos = files.len(), "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// PUT /api/v1/admin/settings/password
pub async fn change_public_password(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<PasswordChange>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    change_password(&state.pool, KEY_PUBLIC_PASSWORD, &input).await?;
    Ok(Json(DataResponse {
        data: MessageResponse {
            message: "Public password updated successfully".into(),
        },
    }))
}

/// PUT /api/v1/admin/settings/admin-password
pub async fn change_admin_password(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<PasswordChange>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    change_password(&state.pool, KEY_ADMIN_PASSWORD, &input).await?;
    Ok(Json(DataResponse {
        data: MessageResponse {
            message: "Admin password updated successfully".into(),
        },
    }))
}

async fn change_password(pool: &PgPool, key: &str, input: &PasswordChange) -> AppResult<()> {
    let stored_hash = SettingRepo::get(pool, key)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("System not configured: {key} is missing")))?;

    let valid = verify_password(&input.old_password, &stored_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }

    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    SettingRepo::set(pool, key, &new_hash).await?;

    tracing::info!(key, "Password changed");
    Ok(())
}
