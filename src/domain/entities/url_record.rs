//! URL record entity mapping a short code to its destination.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored short-code mapping.
///
/// Records are created once by the code allocator and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlRecord {
    pub id: i64,
    pub code: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(id: i64, code: String, destination: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            destination,
            created_at,
        }
    }
}

/// Input data for a conditional insert.
#[derive(Debug, Clone)]
pub struct NewUrlRecord {
    pub code: String,
    /// Already normalized destination.
    pub destination: String,
    pub created_at: DateTime<Utc>,
}

impl NewUrlRecord {
    /// Builds a record stamped with the current time.
    pub fn now(code: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            destination: destination.into(),
            created_at: Utc::now(),
        }
    }
}
