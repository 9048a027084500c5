//! Persisted token records. Only hashes are stored.

pub mod refresh;
pub mod service;

pub use refresh::{CreateRefreshToken, RefreshToken};
pub use service::{CreateServiceToken, ServiceToken};
