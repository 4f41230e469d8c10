//! Cookie session middleware.
//!
//! Every request passes through [`layer`], which turns the session cookie into
//! a [`Session`] request extension. Missing, tampered and expired cookies all
//! become [`Session::Anonymous`]; they are never an error on their own.
//! Routes that need a user add [`require_auth`] on top.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header::COOKIE},
    middleware::Next,
    response::Response,
};
use std::time::Duration;

use crate::domain::entities::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "urlshortener";

/// Resolves the caller's session and stores it in request extensions.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/create", post(create_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), session::layer));
/// ```
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = session_token(req.headers());
    let session = st.session_service.authenticate(token.as_deref());

    req.extensions_mut().insert(session);

    next.run(req).await
}

/// Rejects anonymous callers with `401 Unauthorized`.
///
/// Must run after [`layer`].
pub async fn require_auth(req: Request, next: Next) -> Result<Response, AppError> {
    let authenticated = req
        .extensions()
        .get::<Session>()
        .is_some_and(Session::is_authenticated);

    if !authenticated {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Extracts the session token from the `Cookie` header.
///
/// Handles multiple cookies in one header and ignores unrelated ones.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// Builds the `Set-Cookie` value for a session token.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the token contains bytes not allowed in
/// a header.
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).map_err(|e| {
        AppError::internal("Failed to build session cookie", serde_json::json!({ "reason": e.to_string() }))
    })
}
