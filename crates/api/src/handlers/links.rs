//! Handlers for event links.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use eventplan_core::error::CoreError;
use eventplan_core::types::DbId;
use eventplan_db::models::link::{CreateLink, EventLink};
use eventplan_db::repositories::LinkRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::handlers::events::find_event;
use crate::middleware::rbac::RequireEditor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/events/{id}/links
pub async fn create_link(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    ValidJson(input): ValidJson<CreateLink>,
) -> AppResult<(StatusCode, Json<DataResponse<EventLink>>)> {
    let input = input.normalized()?;
    find_event(&state.pool, event_id).await?;

    let link = LinkRepo::create(&state.pool, event_id, &input).await?;
    tracing::info!(event_id, link_id = link.id, "Link added");
    Ok((StatusCode::CREATED, Json(DataResponse { data: link })))
}

/// DELETE /api/v1/links/{id}
pub async fn delete_link(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !LinkRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Link", id }));
    }
    tracing::info!(link_id = id, "Link deleted");
    Ok(StatusCode::NO_CONTENT)
}
