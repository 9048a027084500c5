//! Tenant management and API-key authentication.

pub mod service;

pub use service::{CreatedTenant, TenantService};
