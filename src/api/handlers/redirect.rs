//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Answers `303 See Other` with the stored destination in `Location`, exactly
/// as it was stored at creation.
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let destination = state.redirect_service.resolve(&code).await?;

    Ok(Redirect::to(&destination))
}
