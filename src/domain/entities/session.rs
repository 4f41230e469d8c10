//! Typed session carried by the signed session cookie.

use serde::{Deserialize, Serialize};

/// Caller identity as established by the session authenticator.
///
/// Every client starts [`Session::Anonymous`]. Login and registration move it
/// to [`Session::Authenticated`]; logout or token expiry move it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { email: String },
}

impl Session {
    pub fn authenticated(email: impl Into<String>) -> Self {
        Self::Authenticated {
            email: email.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Email of the authenticated caller, if any.
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Authenticated { email } => Some(email),
            Self::Anonymous => None,
        }
    }
}

/// Wire form of a session inside the token payload.
///
/// `exp` is a unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub authenticated: bool,
    pub email: String,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(session: &Session, exp: i64) -> Self {
        match session {
            Session::Authenticated { email } => Self {
                authenticated: true,
                email: email.clone(),
                exp,
            },
            Session::Anonymous => Self {
                authenticated: false,
                email: String::new(),
                exp,
            },
        }
    }

    /// Converts validated claims into a session.
    ///
    /// Claims flagged authenticated with an empty email are treated as
    /// anonymous.
    pub fn into_session(self) -> Session {
        if self.authenticated && !self.email.is_empty() {
            Session::Authenticated { email: self.email }
        } else {
            Session::Anonymous
        }
    }
}
