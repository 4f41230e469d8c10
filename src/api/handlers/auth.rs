//! Handlers for registration, login, logout and session inspection.

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::api::dto::auth::{CredentialsRequest, SessionResponse};
use crate::api::middleware::session::session_cookie;
use crate::domain::entities::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a user and logs them in.
///
/// # Endpoint
///
/// `POST /api/register`
///
/// # Errors
///
/// Returns 400 if the email is malformed or already registered.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let session = state
        .session_service
        .register(&payload.email, &payload.password)
        .await?;

    with_session_cookie(&state, StatusCode::CREATED, &session)
}

/// Verifies credentials and issues an authenticated session cookie.
///
/// # Endpoint
///
/// `POST /api/login`
///
/// # Errors
///
/// Returns 400 with the same message for an unknown email and a wrong
/// password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let session = state
        .session_service
        .login(&payload.email, &payload.password)
        .await?;

    with_session_cookie(&state, StatusCode::OK, &session)
}

/// Replaces the session cookie with an anonymous one.
///
/// # Endpoint
///
/// `POST /api/logout`
///
/// Idempotent: logging out an anonymous caller also answers 204.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    let session = state.session_service.logout(&session);
    let token = state.session_service.issue_token(&session)?;
    let cookie = session_cookie(
        &token,
        state.session_service.session_ttl(),
        state.cookie_secure,
    )?;

    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response())
}

/// Returns the caller's session.
///
/// # Endpoint
///
/// `GET /api/session` (authenticated only)
pub async fn session_handler(Extension(session): Extension<Session>) -> Json<SessionResponse> {
    Json(SessionResponse::from(&session))
}

fn with_session_cookie(
    state: &AppState,
    status: StatusCode,
    session: &Session,
) -> Result<Response, AppError> {
    let token = state.session_service.issue_token(session)?;
    let cookie = session_cookie(
        &token,
        state.session_service.session_ttl(),
        state.cookie_secure,
    )?;

    Ok((
        status,
        [(SET_COOKIE, cookie)],
        Json(SessionResponse::from(session)),
    )
        .into_response())
}
