//! Application error taxonomy and its HTTP mapping.
//!
//! Every failure the core can produce is a variant of [`AppError`]. Raw driver
//! errors are converted here or at the repository boundary and never reach the
//! HTTP layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error description returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors returned by services and repositories.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed input rejected before touching any store.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Resolve miss. Expected during normal operation.
    #[error("No short URL found for code '{code}'")]
    NotFound { code: String },

    #[error("Custom code '{code}' is already in use")]
    CodeAlreadyInUse { code: String },

    /// Every candidate in the bounded retry loop collided.
    #[error("Failed to allocate a unique code after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    #[error("Email address is already registered")]
    EmailAlreadyRegistered,

    /// Unknown email and wrong password share this variant.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Not authenticated")]
    Unauthorized,

    /// Timeout or connectivity failure from a store.
    #[error("Storage unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// HTTP status the collaborator layer answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::CodeAlreadyInUse { .. }
            | Self::EmailAlreadyRegistered
            | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::AllocationExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::StoreUnavailable { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable error code for API clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::CodeAlreadyInUse { .. } => "code_already_in_use",
            Self::AllocationExhausted { .. } => "allocation_exhausted",
            Self::EmailAlreadyRegistered => "email_already_registered",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserNotFound => "user_not_found",
            Self::Unauthorized => "unauthorized",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Builds the serializable description of this error.
    ///
    /// Store and internal failures hide their cause from clients; it is logged
    /// where the error is raised.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (message, details) = match self {
            Self::Validation { message, details } => (message.clone(), details.clone()),
            Self::NotFound { code } | Self::CodeAlreadyInUse { code } => {
                (self.to_string(), json!({ "code": code }))
            }
            Self::AllocationExhausted { attempts } => {
                (self.to_string(), json!({ "attempts": attempts }))
            }
            Self::StoreUnavailable { .. } => ("Storage unavailable".to_string(), json!({})),
            Self::Internal { message, .. } => (message.clone(), json!({})),
            _ => (self.to_string(), json!({})),
        };

        ErrorInfo {
            code: self.error_code(),
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", e);
        AppError::store_unavailable(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&e).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}
