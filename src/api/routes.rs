//! `/api` route configuration.

use crate::api::handlers::{login_handler, logout_handler, register_handler, session_handler};
use crate::api::middleware::session;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Session endpoints mounted under `/api`.
///
/// - `POST /register` - Create an account and log in
/// - `POST /login`    - Log in
/// - `POST /logout`   - Replace the session with an anonymous one
/// - `GET  /session`  - Current session (authenticated only)
pub fn session_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/session", get(session_handler))
        .route_layer(middleware::from_fn(session::require_auth));

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
}
