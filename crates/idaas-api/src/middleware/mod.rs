//! Axum middleware stack.

pub mod cors;
pub mod logging;
pub mod service_auth;

pub use service_auth::{guarded, optional};
