//! Scope entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named permission that can be granted to internal clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Scope {
    /// Numeric identifier.
    pub id: i64,
    /// Unique name, e.g. `user:read`.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Inactive scopes resolve but never satisfy a check.
    pub is_active: bool,
    /// When the scope was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a scope.
#[derive(Debug, Clone)]
pub struct CreateScope {
    pub name: String,
    pub description: Option<String>,
}
