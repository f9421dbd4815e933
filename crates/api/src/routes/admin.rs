//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin routes mounted at `/admin`.
///
/// ```text
/// GET    /events                   -> list_events
/// POST   /events                   -> create_event
/// PATCH  /events/{id}              -> update_event
/// PUT    /events/{id}              -> update_event
/// DELETE /events/{id}              -> delete_event
/// POST   /categories               -> create_category
/// DELETE /categories/{id}          -> delete_category
/// PUT    /settings/password        -> change_public_password
/// PUT    /settings/admin-password  -> change_admin_password
/// ```
///
/// All routes require the admin role (enforced by the `RequireAdmin`
/// extractor in each handler).
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(admin::list_events).post(admin::create_event),
        )
        .route(
            "/events/{id}",
            patch(admin::update_event)
                .put(admin::update_event)
                .delete(admin::delete_event),
        )
        .route("/categories", post(admin::create_category))
        .route("/categories/{id}", delete(admin::delete_category))
        .route("/settings/password", put(admin::change_public_password))
        .route("/settings/admin-password", put(admin::change_admin_password))
}
