pub mod auth;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the API route tree.
///
/// ```text
/// /auth/token     POST  issue a token pair
/// /auth/refresh   POST  rotate a token pair
/// /auth/logout    POST  revoke all sessions
/// /me             GET   identity of the access token
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route("/me", get(handlers::auth::me))
}
