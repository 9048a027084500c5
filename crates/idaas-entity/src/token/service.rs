//! Service token revocation-list entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A live service access token. A verified JWT whose hash has no row here
/// is treated as revoked.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceToken {
    /// Hex SHA-256 of the signed token.
    pub token_hash: String,
    /// Owning client.
    pub client_id: String,
    /// Scopes granted at issuance.
    pub scopes: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Data required to record an issued service token.
#[derive(Debug, Clone)]
pub struct CreateServiceToken {
    pub token_hash: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub expires_at: DateTime<Utc>,
}
