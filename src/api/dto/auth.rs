//! DTOs for registration, login and session inspection.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Session;

/// Email and password submitted to `/api/register` and `/api/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Public view of a session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            authenticated: session.is_authenticated(),
            email: session.email().map(str::to_string),
        }
    }
}
