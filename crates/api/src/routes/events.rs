//! Route definitions for the `/events` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::handlers::{events, links, photos};
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET   /                  -> list_month
/// GET   /all               -> list_all
/// GET   /{id}              -> get_event
/// PATCH /{id}              -> update_description
/// GET   /{id}/links        -> list_links
/// POST  /{id}/links        -> create_link
/// GET   /{id}/photos       -> list_photos
/// POST  /{id}/photos       -> upload_photos
/// GET   /{id}/photos/zip   -> download_zip
/// ```
///
/// The upload route has no overall body limit; the handler enforces the
/// per-file limit while streaming.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_month))
        .route("/all", get(events::list_all))
        .route(
            "/{id}",
            get(events::get_event).patch(events::update_description),
        )
        .route(
            "/{id}/links",
            get(events::list_links).post(links::create_link),
        )
        .route(
            "/{id}/photos",
            get(events::list_photos)
                .post(photos::upload_photos)
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/{id}/photos/zip", get(photos::download_zip))
}
