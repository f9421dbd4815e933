//! Handlers for the `/events` resource: public schedule reads and the
//! editor's description update.

use axum::extract::{Path, Query, State};
use axum::Json;
use eventplan_core::error::CoreError;
use eventplan_core::search::filter_groups;
use eventplan_core::types::DbId;
use eventplan_db::models::category::{validate_month, CategoryWithEvents};
use eventplan_db::models::event::{Event, EventWithRelations, UpdateEvent, UpdateEventDescription};
use eventplan_db::models::link::EventLink;
use eventplan_db::models::photo::Photo;
use eventplan_db::repositories::{EventRepo, LinkRepo, PhotoRepo, ScheduleRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::rbac::RequireEditor;
use crate::query::{MonthParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Load an event or fail with 404.
pub(crate) async fn find_event(pool: &PgPool, id: DbId) -> AppResult<Event> {
    EventRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))
}

/// Apply the optional `q` filter to an assembled schedule.
fn search(groups: Vec<CategoryWithEvents>, q: Option<&str>) -> Vec<CategoryWithEvents> {
    match q {
        Some(q) => filter_groups(&groups, q),
        None => groups,
    }
}

/// GET /api/v1/events?month=1..12&q=
///
/// Categories of one month with their events, links and photos.
pub async fn list_month(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> AppResult<Json<DataResponse<Vec<CategoryWithEvents>>>> {
    validate_month(params.month)?;
    let groups = ScheduleRepo::month(&state.pool, params.month).await?;
    Ok(Json(DataResponse {
        data: search(groups, params.q.as_deref()),
    }))
}

/// GET /api/v1/events/all?q=
///
/// The whole year, ordered by month then sort order.
pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<CategoryWithEvents>>>> {
    let groups = ScheduleRepo::all(&state.pool).await?;
    Ok(Json(DataResponse {
        data: search(groups, params.q.as_deref()),
    }))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventWithRelations>>> {
    let event = ScheduleRepo::event(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    Ok(Json(DataResponse { data: event }))
}

/// GET /api/v1/events/{id}/links
pub async fn list_links(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EventLink>>>> {
    find_event(&state.pool, id).await?;
    let links = LinkRepo::list_by_event(&state.pool, id).await?;
    Ok(Json(DataResponse { data: links }))
}

/// GET /api/v1/events/{id}/photos
///
/// Newest first.
pub async fn list_photos(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Photo>>>> {
    find_event(&state.pool, id).await?;
    let photos = PhotoRepo::list_by_event(&state.pool, id).await?;
    Ok(Json(DataResponse { data: photos }))
}

/// PATCH /api/v1/events/{id}
///
/// Editor update of the description only. An omitted `description` leaves
/// it unchanged, `null` or blank text clears it, anything else replaces it.
/// Other keys in the body are ignored.
pub async fn update_description(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateEventDescription>,
) -> AppResult<Json<DataResponse<EventWithRelations>>> {
    let patch = UpdateEvent::from(input).normalized()?;
    let noop = patch.is_noop();

    let event = EventRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;

    if !noop {
        tracing::info!(
            event_id = id,
            role = %user.role,
            cleared = event.description.is_none(),
            "Event description updated"
        );
    }

    let event = ScheduleRepo::attach(&state.pool, vec![event])
        .await?
        .pop()
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    Ok(Json(DataResponse { data: event }))
}
