//! Credential verification and session token issuance.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use serde_json::json;

use crate::domain::entities::{NewUser, Session, SessionClaims};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::session_token::SessionSigner;
use crate::utils::store_timeout::with_timeout;

/// Hash verified against when the email is unknown, so that unknown-email
/// and wrong-password logins cost the same.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Session authenticator.
///
/// Sessions are stateless: the only server-side state is the signing key.
/// One instance is built at startup and shared by every handler.
pub struct SessionService<U: UserRepository + ?Sized> {
    user_repository: Arc<U>,
    signer: SessionSigner,
    session_ttl: Duration,
    store_timeout: Duration,
}

impl<U: UserRepository + ?Sized> SessionService<U> {
    /// Creates a new session service.
    ///
    /// # Arguments
    ///
    /// - `user_repository` - credential store
    /// - `signer` - HMAC signer keyed by the configured session secret
    /// - `session_ttl` - lifetime of issued tokens
    /// - `store_timeout` - bound on each credential store call
    pub fn new(
        user_repository: Arc<U>,
        signer: SessionSigner,
        session_ttl: Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            user_repository,
            signer,
            session_ttl,
            store_timeout,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Registers a new user and returns an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmailAlreadyRegistered`] if the email is taken.
    /// Returns [`AppError::StoreUnavailable`] on storage failures or timeout.
    pub async fn register(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = normalize_email(email);

        let existing = with_timeout(
            self.store_timeout,
            "find_user",
            self.user_repository.find_by_email(&email),
        )
        .await?;
        if existing.is_some() {
            return Err(AppError::EmailAlreadyRegistered);
        }

        let password_hash = hash_password(password.to_string()).await?;

        // The store's unique constraint settles a concurrent registration race.
        let user = with_timeout(
            self.store_timeout,
            "create_user",
            self.user_repository.create(NewUser {
                email,
                password_hash,
            }),
        )
        .await?;

        tracing::info!(user_id = user.id, "Registered user");
        Ok(Session::authenticated(user.email))
    }

    /// Verifies credentials and returns an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidCredentials`] for an unknown email or a wrong
    /// password; the two cases are indistinguishable.
    /// Returns [`AppError::StoreUnavailable`] on storage failures or timeout.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = normalize_email(email);

        let user = with_timeout(
            self.store_timeout,
            "find_user",
            self.user_repository.find_by_email(&email),
        )
        .await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let verified = verify_password(password.to_string(), stored_hash).await?;

        match user {
            Some(user) if verified => {
                tracing::debug!(user_id = user.id, "Login succeeded");
                Ok(Session::authenticated(user.email))
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    /// Ends a session. Idempotent.
    pub fn logout(&self, session: &Session) -> Session {
        if let Some(email) = session.email() {
            tracing::debug!(email, "Logged out");
        }
        Session::Anonymous
    }

    /// Validates a presented token.
    ///
    /// Missing, malformed, tampered and expired tokens all yield
    /// [`Session::Anonymous`].
    pub fn authenticate(&self, token: Option<&str>) -> Session {
        let Some(claims) = token.and_then(|t| self.signer.verify(t)) else {
            return Session::Anonymous;
        };

        if claims.exp <= Utc::now().timestamp() {
            return Session::Anonymous;
        }

        claims.into_session()
    }

    /// Signs a session into a token valid for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the token cannot be encoded.
    pub fn issue_token(&self, session: &Session) -> Result<String, AppError> {
        let ttl = i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX);
        let exp = Utc::now().timestamp().saturating_add(ttl);
        self.signer.sign(&SessionClaims::new(session, exp))
    }
}

/// Canonical form of an email used as the credential store key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Hashes a password with Argon2id and a random salt.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| AppError::internal("Password hashing task failed", json!({ "reason": e.to_string() })))?
    .map_err(|e| {
        tracing::error!("Error hashing password: {}", e);
        AppError::internal("Error hashing password", json!({}))
    })
}

/// Verifies a password against a stored hash.
///
/// With no stored hash, a dummy hash is verified instead and `false` is
/// returned.
async fn verify_password(password: String, stored_hash: Option<String>) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || -> Result<bool, String> {
        let argon2 = Argon2::default();

        let Some(stored_hash) = stored_hash else {
            let dummy = DUMMY_HASH.get_or_init(|| {
                let salt = SaltString::generate(&mut OsRng);
                argon2
                    .hash_password(b"dummy-password", &salt)
                    .map(|hash| hash.to_string())
                    .ok()
            });
            if let Some(parsed) = dummy.as_deref().and_then(|h| PasswordHash::new(h).ok()) {
                let _ = argon2.verify_password(password.as_bytes(), &parsed);
            }
            return Ok(false);
        };

        let parsed = PasswordHash::new(&stored_hash).map_err(|e| e.to_string())?;
        Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|e| AppError::internal("Password verification task failed", json!({ "reason": e.to_string() })))?
    .map_err(|reason| {
        tracing::error!("Stored password hash is malformed: {}", reason);
        AppError::internal("Error comparing passwords", json!({}))
    })
}
