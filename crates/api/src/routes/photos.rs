//! Route definitions for the `/photos` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::photos;
use crate::state::AppState;

/// Routes mounted at `/photos`.
///
/// ```text
/// DELETE /{id}           -> delete_photo
/// GET    /{id}/original  -> download_original
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(photos::delete_photo))
        .route("/{id}/original", get(photos::download_original))
}
