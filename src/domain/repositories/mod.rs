//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated by `mockall` for unit tests.
//!
//! - [`RecordRepository`] - URL records keyed by code
//! - [`UserRepository`] - credentials and per-user history

pub mod record_repository;
pub mod user_repository;

pub use record_repository::RecordRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use record_repository::MockRecordRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
