//! Handler for the caller's code history.

use axum::{Extension, Json, extract::State};

use crate::api::dto::history::HistoryItem;
use crate::domain::entities::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the codes the caller created while logged in, oldest first.
///
/// # Endpoint
///
/// `GET /dashboard` (authenticated only)
///
/// # Errors
///
/// Returns 401 for anonymous callers and 404 if the user record is gone.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<HistoryItem>>, AppError> {
    let email = session.email().ok_or(AppError::Unauthorized)?;

    let records = state.history_service.list(email).await?;

    let items = records
        .into_iter()
        .map(|record| HistoryItem {
            short_url: state.short_url(&record.code),
            code: record.code,
            destination: record.destination,
            created_at: record.created_at,
        })
        .collect();

    Ok(Json(items))
}
