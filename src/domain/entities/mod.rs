//! Core domain entities.
//!
//! Entities are plain data structures. Construction inputs live in separate
//! `New*` structs so that store-assigned fields (`id`, `created_at` for users)
//! cannot be set by callers.
//!
//! - [`UrlRecord`] - an immutable `code -> destination` binding
//! - [`User`] - a registered user with an ordered code history
//! - [`Session`] - the authentication state of a caller

pub mod session;
pub mod url_record;
pub mod user;

pub use session::{Session, SessionClaims};
pub use url_record::{NewUrlRecord, UrlRecord};
pub use user::{NewUser, User};
