//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod create;
pub mod dashboard;
pub mod health;
pub mod redirect;

pub use auth::{login_handler, logout_handler, register_handler, session_handler};
pub use create::create_handler;
pub use dashboard::dashboard_handler;
pub use health::health_handler;
pub use redirect::redirect_handler;
