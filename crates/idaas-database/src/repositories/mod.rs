//! PostgreSQL repository implementations of the credential store traits.

pub mod access_log;
pub mod client;
pub mod refresh_token;
pub mod scope;
pub mod service_token;
pub mod tenant;
pub mod user;

pub use access_log::AccessLogRepository;
pub use client::ClientRepository;
pub use refresh_token::RefreshTokenRepository;
pub use scope::ScopeRepository;
pub use service_token::ServiceTokenRepository;
pub use tenant::TenantRepository;
pub use user::UserRepository;

use idaas_core::error::{AppError, ErrorKind};

/// Map an insert failure, turning unique violations into conflicts.
pub(crate) fn insert_error(err: sqlx::Error, conflict: &str, failure: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::conflict(conflict),
        _ => AppError::with_source(ErrorKind::Database, failure, err),
    }
}
