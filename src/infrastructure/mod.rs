//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`cache`] - Resolve cache (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL and in-memory repository implementations

pub mod cache;
pub mod persistence;
