//! DTOs for the dashboard endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry of the caller's code history.
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub code: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub short_url: String,
}
