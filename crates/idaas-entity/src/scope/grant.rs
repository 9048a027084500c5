//! Client scope grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Existence of this row is the sole source of truth for "client has scope".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientScopeGrant {
    pub client_id: String,
    pub scope_id: i64,
    /// Who granted the scope, when known.
    pub granted_by: Option<String>,
    pub granted_at: DateTime<Utc>,
}

/// Data required to insert a grant.
#[derive(Debug, Clone)]
pub struct CreateGrant {
    pub client_id: String,
    pub scope_id: i64,
    pub granted_by: Option<String>,
}
