//! Route definitions for the `/links` resource.

use axum::routing::delete;
use axum::Router;

use crate::handlers::links;
use crate::state::AppState;

/// Routes mounted at `/links`.
///
/// ```text
/// DELETE /{id}  -> delete_link
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(links::delete_link))
}
