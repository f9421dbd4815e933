pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod links;
pub mod photos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                 public password login
/// /auth/admin/login                           admin password login
/// /auth/check                                 token check (requires auth)
///
/// /events?month=&q=                           one month (public)
/// /events/all?q=                              the whole year (public)
/// /events/{id}                                get (public), patch description (editor)
/// /events/{id}/links                          list (public), create (editor)
/// /events/{id}/photos                         list (public), upload (editor)
/// /events/{id}/photos/zip                     download originals as ZIP (editor)
///
/// /links/{id}                                 delete (editor)
///
/// /photos/{id}                                delete (editor)
/// /photos/{id}/original                       download original (public)
///
/// /admin/events                               list, create (admin only)
/// /admin/events/{id}                          patch/put, delete
/// /admin/categories                           create
/// /admin/categories/{id}                      delete
/// /admin/settings/password                    change public password (PUT)
/// /admin/settings/admin-password              change admin password (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, admin login, check).
        .nest("/auth", auth::router())
        // Public schedule reads and editor writes on events.
        .nest("/events", events::router())
        .nest("/links", links::router())
        .nest("/photos", photos::router())
        // Event, category and password management.
        .nest("/admin", admin::router())
}
