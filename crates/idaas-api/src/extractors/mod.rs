//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod pagination;

pub use auth::{AuthUser, MaybeCaller, ServiceCaller, TenantKey};
pub use client::ClientInfo;
pub use pagination::{LogQuery, SinceQuery};
