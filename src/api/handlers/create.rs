//! Handler for the create endpoint.

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::api::dto::create::{CreateRequest, CreateResponse};
use crate::domain::entities::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Allocates a short code for a destination.
///
/// # Endpoint
///
/// `POST /create`
///
/// # Request Body
///
/// ```json
/// { "url": "example.com/page", "custom_code": "promo" }
/// ```
///
/// `custom_code` is optional. When the caller carries an authenticated session
/// cookie, the new code is appended to their history.
///
/// # Response
///
/// ```json
/// {
///   "code": "promo",
///   "short_url": "https://s.example.com/promo",
///   "destination": "http://example.com/page"
/// }
/// ```
///
/// # Errors
///
/// - 400 for an invalid URL or custom code, or a custom code already in use
/// - 503 when no free generated code was found within the attempt bound
pub async fn create_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateRequest>,
) -> Result<Json<CreateResponse>, AppError> {
    payload.validate()?;

    let allocation = state
        .link_service
        .create_code(&payload.url, payload.custom_code, &session)
        .await?;

    let record = allocation.record;

    Ok(Json(CreateResponse {
        short_url: state.short_url(&record.code),
        code: record.code,
        destination: record.destination,
    }))
}
