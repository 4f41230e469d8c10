//! Repository trait for the credential store.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable mapping from email to user credentials and code history.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUserRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user with an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmailAlreadyRegistered`] if the email is taken.
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Atomically appends a record id to the user's history.
    ///
    /// Ids already present are not appended twice.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the user exists (whether or not the id was new)
    /// - `Ok(false)` if no user has this email
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn append_history(&self, email: &str, record_id: i64) -> Result<bool, AppError>;

    /// Counts registered users.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn count(&self) -> Result<i64, AppError>;
}
