//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /create`     - Allocate a short code (anonymous or logged in)
//! - `GET  /{code}`     - Short link redirect
//! - `GET  /dashboard`  - Caller's code history (session required)
//! - `GET  /health`     - Store and cache health
//! - `/api/*`           - Register, login, logout, session
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Session** - Cookie session resolved for every request
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{create_handler, dashboard_handler, health_handler, redirect_handler};
use crate::api::middleware::{session, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and middleware without path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/create", post(create_handler))
        .route(
            "/dashboard",
            get(dashboard_handler).route_layer(middleware::from_fn(session::require_auth)),
        )
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api::routes::session_routes())
        .layer(middleware::from_fn_with_state(state.clone(), session::layer))
        .with_state(state)
        .layer(tracing::layer())
}
