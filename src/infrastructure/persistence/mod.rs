//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgRecordRepository`] / [`PgUserRepository`] - PostgreSQL via SQLx
//! - [`MemoryRecordRepository`] / [`MemoryUserRepository`] - in-process, for
//!   development and tests

pub mod memory;
pub mod pg_record_repository;
pub mod pg_user_repository;

pub use memory::{MemoryRecordRepository, MemoryUserRepository};
pub use pg_record_repository::PgRecordRepository;
pub use pg_user_repository::PgUserRepository;
