//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Collision-safe code allocation
//! - [`services::redirect_service::RedirectService`] - Code resolution
//! - [`services::session_service::SessionService`] - Registration, login and session tokens
//! - [`services::history_service::HistoryService`] - Per-user code history

pub mod services;
