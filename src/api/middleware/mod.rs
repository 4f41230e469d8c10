//! HTTP middleware for request processing.
//!
//! Provides session extraction, the authenticated-route guard, and request
//! tracing.

pub mod session;
pub mod tracing;
