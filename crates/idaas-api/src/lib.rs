//! # idaas-api
//!
//! HTTP API layer for IDaaS built on Axum.
//!
//! Provides the OAuth2 token endpoint, the tenant/user and internal-service
//! routes, scope enforcement middleware, extractors, DTOs and the
//! application builder.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
