//! Utility functions for code generation, URL processing, and session tokens.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`url_normalizer`] - Destination normalization
//! - [`session_token`] - HMAC-signed session tokens
//! - [`store_timeout`] - Timeout wrapper for store calls

pub mod code_generator;
pub mod session_token;
pub mod store_timeout;
pub mod url_normalizer;
