//! Token lifecycle manager.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use idaas_core::config::TokenConfig;
use idaas_core::error::AppError;
use idaas_core::result::AppResult;
use idaas_database::store::{RefreshTokenStore, ScopeStore, ServiceTokenStore};
use idaas_entity::client::InternalClient;
use idaas_entity::principal::Principal;
use idaas_entity::token::{CreateRefreshToken, CreateServiceToken};

use crate::jwt::{ServiceClaims, Signer, UserClaims};
use crate::password::generator::generate_opaque_token;

use super::hash::sha256_hex;

/// A freshly issued credential. The plaintext exists only here.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of the client-credentials exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceAccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds.
    pub expires_in: i64,
    #[serde(skip)]
    pub expires_at: DateTime<Utc>,
    /// Scope snapshot embedded in the token.
    pub scopes: Vec<String>,
}

/// Outcome of validating a service token. Invalid tokens are a normal
/// result, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub message: String,
    #[serde(skip)]
    pub claims: Option<ServiceClaims>,
}

impl TokenValidation {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            client_id: None,
            scopes: Vec::new(),
            expires_at: None,
            message: message.into(),
            claims: None,
        }
    }

    fn valid(claims: ServiceClaims) -> Self {
        Self {
            valid: true,
            client_id: Some(claims.sub.clone()),
            scopes: claims.scopes.clone(),
            expires_at: Some(claims.exp),
            message: "Token is valid".to_string(),
            claims: Some(claims),
        }
    }
}

/// Issues, rotates, validates and revokes user and service tokens.
pub struct TokenManager {
    user_signer: Arc<Signer>,
    service_signer: Arc<Signer>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    service_tokens: Arc<dyn ServiceTokenStore>,
    scopes: Arc<dyn ScopeStore>,
    config: TokenConfig,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("user_signer", &self.user_signer)
            .field("service_signer", &self.service_signer)
            .field("config", &self.config)
            .finish()
    }
}

impl TokenManager {
    /// Creates a new token manager.
    pub fn new(
        user_signer: Arc<Signer>,
        service_signer: Arc<Signer>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        service_tokens: Arc<dyn ServiceTokenStore>,
        scopes: Arc<dyn ScopeStore>,
        config: TokenConfig,
    ) -> Self {
        Self {
            user_signer,
            service_signer,
            refresh_tokens,
            service_tokens,
            scopes,
            config,
        }
    }

    /// Default lifetime of user access tokens.
    pub fn user_access_ttl(&self) -> Duration {
        Duration::seconds(self.config.user_access_ttl_seconds as i64)
    }

    /// Default lifetime of service access tokens.
    pub fn service_access_ttl(&self) -> Duration {
        Duration::seconds(self.config.service_access_ttl_seconds as i64)
    }

    fn refresh_ttl(&self) -> Duration {
        Duration::days(self.config.refresh_ttl_days as i64)
    }

    /// Sign a stateless access token for an end user.
    pub fn issue_user_access_token(
        &self,
        principal: &Principal,
        ttl: Duration,
    ) -> AppResult<IssuedToken> {
        let Principal::EndUser {
            id,
            tenant_id,
            email,
        } = principal
        else {
            return Err(AppError::validation(
                "User access tokens can only be issued to end users",
            ));
        };

        let now = Utc::now();
        let claims = UserClaims::new(id, tenant_id, email, now, ttl);
        let token = self.user_signer.sign(&claims)?;

        debug!(user_id = %id, tenant_id = %tenant_id, "User access token issued");
        Ok(IssuedToken {
            token,
            expires_at: now + ttl,
        })
    }

    /// Verify a user access token and return its claims.
    pub fn verify_user_access_token(&self, token: &str) -> AppResult<UserClaims> {
        Ok(self.user_signer.parse::<UserClaims>(token)?)
    }

    /// Issue a refresh token, invalidating every earlier one for the user.
    pub async fn issue_user_refresh_token(
        &self,
        user_id: &str,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<IssuedToken> {
        let token = generate_opaque_token();
        let expires_at = Utc::now() + self.refresh_ttl();

        self.refresh_tokens
            .rotate_refresh_token(&CreateRefreshToken {
                token_hash: sha256_hex(&token),
                user_id: user_id.to_string(),
                client_ip: client_ip.map(str::to_string),
                user_agent: user_agent.map(str::to_string),
                expires_at,
            })
            .await?;

        info!(target: "audit", user_id = %user_id, "Refresh token issued");
        Ok(IssuedToken { token, expires_at })
    }

    /// Redeem a refresh token once and return its owner's user ID.
    pub async fn consume_refresh_token(&self, token: &str) -> AppResult<String> {
        let consumed = self
            .refresh_tokens
            .consume_refresh_token(&sha256_hex(token))
            .await?;

        match consumed {
            Some(row) => Ok(row.user_id),
            None => {
                warn!(target: "audit", "Invalid or expired refresh token presented");
                Err(AppError::token_invalid("Invalid or expired refresh token"))
            }
        }
    }

    /// Sign a service access token carrying the client's current scopes and
    /// record its hash in the live-token set.
    pub async fn issue_service_access_token(
        &self,
        client: &InternalClient,
        ttl: Duration,
    ) -> AppResult<ServiceAccessToken> {
        if !client.is_active {
            return Err(AppError::authentication("Client is inactive"));
        }

        let scopes: Vec<String> = self
            .scopes
            .client_scopes(&client.client_id)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();

        let now = Utc::now();
        let claims = ServiceClaims::new(&client.client_id, scopes.clone(), now, ttl);
        let token = self.service_signer.sign(&claims)?;
        let expires_at = now + ttl;

        self.service_tokens
            .insert_service_token(&CreateServiceToken {
                token_hash: sha256_hex(&token),
                client_id: client.client_id.clone(),
                scopes: scopes.clone(),
                expires_at,
            })
            .await?;

        info!(
            target: "audit",
            client_id = %client.client_id,
            scopes = ?scopes,
            "Service access token issued"
        );

        Ok(ServiceAccessToken {
            access_token: token,
            token_type: "Bearer",
            expires_in: ttl.num_seconds(),
            expires_at,
            scopes,
        })
    }

    /// Verify signature and validity window, then require the token to be
    /// in the live-token set. Store failures are errors; every other
    /// rejection is reported in the result.
    pub async fn validate_service_token(&self, token: &str) -> AppResult<TokenValidation> {
        let claims = match self.service_signer.parse::<ServiceClaims>(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Service token rejected");
                return Ok(TokenValidation::invalid(e.to_string()));
            }
        };

        let live = self
            .service_tokens
            .find_live_service_token(&sha256_hex(token))
            .await?;

        match live {
            Some(_) => Ok(TokenValidation::valid(claims)),
            None => {
                debug!(client_id = %claims.sub, "Service token not in live set");
                Ok(TokenValidation::invalid("Token has been revoked"))
            }
        }
    }

    /// Remove a service token from the live-token set.
    pub async fn revoke_service_token(&self, token: &str) -> AppResult<bool> {
        let removed = self
            .service_tokens
            .delete_service_token(&sha256_hex(token))
            .await?;
        if removed {
            info!(target: "audit", "Service token revoked");
        }
        Ok(removed)
    }

    /// Delete service tokens past their expiry. Idempotent.
    pub async fn cleanup_expired_tokens(&self) -> AppResult<u64> {
        let removed = self.service_tokens.delete_expired_service_tokens().await?;
        debug!(removed, "Expired service tokens deleted");
        Ok(removed)
    }

    /// Delete refresh tokens past their expiry. Idempotent.
    pub async fn cleanup_expired_refresh_tokens(&self) -> AppResult<u64> {
        let removed = self.refresh_tokens.delete_expired_refresh_tokens().await?;
        debug!(removed, "Expired refresh tokens deleted");
        Ok(removed)
    }
}
