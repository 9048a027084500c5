//! Typed claims, one structure per principal kind.
//!
//! Unknown fields are rejected at deserialization, so a user token can never
//! be read as a service token or the other way round.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Issuer of every service access token.
pub const SERVICE_TOKEN_ISSUER: &str = "idaas-internal";

/// Audience of every service access token.
pub const SERVICE_TOKEN_AUDIENCE: &str = "internal-services";

/// Behaviour shared by every claims structure the signer handles.
pub trait TokenClaims: Serialize + DeserializeOwned {
    /// Subject identifier.
    fn subject(&self) -> &str;

    /// Expiry as a Unix timestamp.
    fn expires_at(&self) -> i64;

    /// Tighten validation with claim-specific checks.
    fn configure_validation(validation: &mut Validation) {
        validation.validate_aud = false;
    }
}

/// Claims of an end-user access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserClaims {
    /// User ID.
    pub sub: String,
    /// Tenant the user belongs to.
    pub tenant_id: String,
    /// User email.
    pub email: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Not before (Unix timestamp).
    pub nbf: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl UserClaims {
    /// Build claims valid from `now` for `ttl`.
    pub fn new(
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        email: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: user_id.into(),
            tenant_id: tenant_id.into(),
            email: email.into(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

impl TokenClaims for UserClaims {
    fn subject(&self) -> &str {
        &self.sub
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Claims of an internal-service access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceClaims {
    /// Client ID.
    pub sub: String,
    /// Always [`SERVICE_TOKEN_ISSUER`].
    pub iss: String,
    /// Always [`SERVICE_TOKEN_AUDIENCE`].
    pub aud: String,
    /// Scopes granted at issuance.
    pub scopes: Vec<String>,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Not before (Unix timestamp).
    pub nbf: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl ServiceClaims {
    /// Build claims valid from `now` for `ttl`.
    pub fn new(
        client_id: impl Into<String>,
        scopes: Vec<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: client_id.into(),
            iss: SERVICE_TOKEN_ISSUER.to_string(),
            aud: SERVICE_TOKEN_AUDIENCE.to_string(),
            scopes,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

impl TokenClaims for ServiceClaims {
    fn subject(&self) -> &str {
        &self.sub
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }

    fn configure_validation(validation: &mut Validation) {
        validation.set_issuer(&[SERVICE_TOKEN_ISSUER]);
        validation.set_audience(&[SERVICE_TOKEN_AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "nbf", "sub", "iss", "aud"]);
    }
}
