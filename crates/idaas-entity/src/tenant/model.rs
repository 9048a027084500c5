//! Tenant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An isolated customer of the identity service. Users belong to exactly
/// one tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Identifier, `tnt_` followed by 32 hex characters.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Public API key presented by tenant applications.
    pub api_public_key: String,
    /// Argon2 hash of the secret API key.
    #[serde(skip_serializing)]
    pub api_secret_key_hash: String,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
    /// When the tenant was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a tenant.
#[derive(Debug, Clone)]
pub struct CreateTenant {
    pub id: String,
    pub name: String,
    pub api_public_key: String,
    pub api_secret_key_hash: String,
}
