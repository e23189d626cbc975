pub mod auth;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /projects                                        list, create
/// /projects/{id}                                   get, put, patch, delete
/// /projects/{id}/complete                          mark completed (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Account and token routes.
        .nest("/auth", auth::router())
        // Owner-scoped project routes.
        .nest("/projects", project::router())
}
