//! # idaas-service
//!
//! Application services for IDaaS. Each service orchestrates the credential
//! store, the token manager and the scope engine to implement one family of
//! use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod access_log;
pub mod context;
pub mod internal;
pub mod tenant;
pub mod user;

pub use access_log::AccessLogRecorder;
pub use context::RequestContext;
pub use internal::InternalServiceRegistry;
pub use tenant::TenantService;
pub use user::UserService;
