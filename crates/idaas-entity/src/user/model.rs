//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::principal::Principal;

/// An end user of a tenant application.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Identifier, `usr_` followed by 32 hex characters.
    pub id: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Email address, unique within the tenant.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Free-form profile document.
    pub profile: Option<serde_json::Value>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The principal this user authenticates as.
    pub fn principal(&self) -> Principal {
        Principal::EndUser {
            id: self.id.clone(),
            tenant_id: self.tenant_id.clone(),
            email: self.email.clone(),
        }
    }

    /// Profile document, or an empty object when none was stored.
    pub fn profile_or_empty(&self) -> serde_json::Value {
        self.profile
            .clone()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()))
    }
}

/// Data required to create a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: String,
    pub tenant_id: String,
    pub email: String,
    pub password_hash: String,
    pub profile: Option<serde_json::Value>,
}

/// Partial update of a user. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub profile: Option<serde_json::Value>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none() && self.profile.is_none()
    }
}
