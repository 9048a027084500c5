//! Internal client entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::principal::Principal;

/// A registered internal service that authenticates with the
/// client-credentials grant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InternalClient {
    /// Public client identifier.
    pub client_id: String,
    /// Argon2 hash of the client secret.
    #[serde(skip_serializing)]
    pub client_secret_hash: String,
    /// Human-readable service name.
    pub service_name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Inactive clients cannot obtain tokens.
    pub is_active: bool,
    /// When the client was registered.
    pub created_at: DateTime<Utc>,
    /// When the client was last updated.
    pub updated_at: DateTime<Utc>,
}

impl InternalClient {
    /// The principal this client authenticates as.
    pub fn principal(&self) -> Principal {
        Principal::InternalService {
            client_id: self.client_id.clone(),
            service_name: self.service_name.clone(),
        }
    }
}

/// Data required to register a client.
#[derive(Debug, Clone)]
pub struct CreateInternalClient {
    pub client_id: String,
    pub client_secret_hash: String,
    pub service_name: String,
    pub description: Option<String>,
}
