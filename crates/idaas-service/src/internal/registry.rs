//! Internal-service registry.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use idaas_auth::password::PasswordHasher;
use idaas_auth::password::generator::{generate_client_id, generate_opaque_token};
use idaas_auth::scope::ScopeAuthorizer;
use idaas_auth::token::{ServiceAccessToken, TokenManager, TokenValidation};
use idaas_core::error::AppError;
use idaas_core::result::AppResult;
use idaas_database::store::{AccessLogStore, ClientStore};
use idaas_entity::access_log::ServiceAccessLog;
use idaas_entity::client::{CreateInternalClient, InternalClient};

use super::types::{
    AccessStatistics, PermissionCheck, RegisterServiceRequest, RegisteredService, ScopeChange,
    ServiceInfo, ServiceList,
};

/// Default page size of access-log listings.
pub const DEFAULT_LOG_LIMIT: i64 = 50;

/// Upper bound of access-log page size.
pub const MAX_LOG_LIMIT: i64 = 500;

/// Manages internal-service clients and their credentials.
pub struct InternalServiceRegistry {
    clients: Arc<dyn ClientStore>,
    access_logs: Arc<dyn AccessLogStore>,
    tokens: Arc<TokenManager>,
    scopes: ScopeAuthorizer,
    hasher: Arc<PasswordHasher>,
    /// Verified against when the client is unknown, so both paths cost one
    /// hash verification.
    dummy_hash: String,
}

impl std::fmt::Debug for InternalServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalServiceRegistry")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl InternalServiceRegistry {
    /// Creates a new registry.
    pub fn new(
        clients: Arc<dyn ClientStore>,
        access_logs: Arc<dyn AccessLogStore>,
        tokens: Arc<TokenManager>,
        scopes: ScopeAuthorizer,
        hasher: Arc<PasswordHasher>,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash(&generate_opaque_token())?;
        Ok(Self {
            clients,
            access_logs,
            tokens,
            scopes,
            hasher,
            dummy_hash,
        })
    }

    /// Register a service, grant the requested scopes, and return the
    /// plaintext secret exactly once.
    pub async fn register_service(&self, req: RegisterServiceRequest) -> AppResult<RegisteredService> {
        let service_name = req.service_name.trim();
        if service_name.is_empty() {
            return Err(AppError::validation("service_name is required"));
        }

        let known: HashSet<String> = self
            .scopes
            .list_scopes()
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        if let Some(unknown) = req.scopes.iter().find(|s| !known.contains(s.as_str())) {
            return Err(AppError::not_found(format!("Scope '{unknown}' not found")));
        }

        let client_id = generate_client_id();
        let client_secret = generate_opaque_token();
        let client = self
            .clients
            .create_client(&CreateInternalClient {
                client_id: client_id.clone(),
                client_secret_hash: self.hasher.hash(&client_secret)?,
                service_name: service_name.to_string(),
                description: req.description.clone(),
            })
            .await?;

        for scope in &req.scopes {
            self.scopes
                .grant_scope(&client.client_id, scope, Some("registration"))
                .await?;
        }
        let scopes = self.scopes.client_scopes(&client.client_id).await?;

        info!(
            target: "audit",
            client_id = %client.client_id,
            service_name = %client.service_name,
            "Internal service registered"
        );

        Ok(RegisteredService {
            client_id: client.client_id,
            client_secret,
            service_name: client.service_name,
            description: client.description,
            scopes,
            created_at: client.created_at,
            message: "Service registered successfully".to_string(),
            warning: "Store the client_secret securely. It will not be shown again.".to_string(),
        })
    }

    /// Resolve a client and verify its secret against the stored hash.
    ///
    /// Unknown client, wrong secret and inactive client all fail with the
    /// same authentication error.
    pub async fn verify_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> AppResult<InternalClient> {
        let rejected = || AppError::authentication("Invalid client credentials");

        let Some(client) = self.clients.find_client(client_id).await? else {
            self.hasher.verify(client_secret, &self.dummy_hash)?;
            warn!(target: "audit", client_id = %client_id, "Authentication for unknown client");
            return Err(rejected());
        };

        if !self.hasher.verify(client_secret, &client.client_secret_hash)? {
            warn!(target: "audit", client_id = %client_id, "Invalid client secret");
            return Err(rejected());
        }

        if !client.is_active {
            warn!(target: "audit", client_id = %client_id, "Authentication for inactive client");
            return Err(rejected());
        }

        Ok(client)
    }

    /// Exchange client credentials for a service access token.
    pub async fn authenticate_service(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> AppResult<ServiceAccessToken> {
        let client = self.verify_client_credentials(client_id, client_secret).await?;
        self.tokens
            .issue_service_access_token(&client, self.tokens.service_access_ttl())
            .await
    }

    pub async fn validate_token(&self, token: &str) -> AppResult<TokenValidation> {
        self.tokens.validate_service_token(token).await
    }

    async fn require_client(&self, client_id: &str) -> AppResult<InternalClient> {
        self.clients
            .find_client(client_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Client '{client_id}' not found")))
    }

    pub async fn grant_scope(
        &self,
        client_id: &str,
        scope_name: &str,
        granted_by: Option<&str>,
    ) -> AppResult<ScopeChange> {
        self.require_client(client_id).await?;
        self.scopes.grant_scope(client_id, scope_name, granted_by).await?;
        Ok(ScopeChange {
            success: true,
            message: format!("Scope '{scope_name}' granted to client '{client_id}'"),
        })
    }

    pub async fn revoke_scope(&self, client_id: &str, scope_name: &str) -> AppResult<ScopeChange> {
        self.require_client(client_id).await?;
        self.scopes.revoke_scope(client_id, scope_name).await?;
        Ok(ScopeChange {
            success: true,
            message: format!("Scope '{scope_name}' revoked from client '{client_id}'"),
        })
    }

    pub async fn check_permission(
        &self,
        client_id: &str,
        scope_name: &str,
    ) -> AppResult<PermissionCheck> {
        let has_permission = self.scopes.has_scope(client_id, scope_name).await?;
        let message = if has_permission {
            "Permission granted"
        } else {
            "Permission denied"
        };
        Ok(PermissionCheck {
            has_permission,
            message: message.to_string(),
        })
    }

    /// Every registered service with its scopes. A client whose scopes
    /// cannot be loaded is listed without them.
    pub async fn list_services(&self) -> AppResult<ServiceList> {
        let clients = self.clients.list_clients().await?;
        let mut services = Vec::with_capacity(clients.len());

        for client in clients {
            let scopes = match self.scopes.client_scopes(&client.client_id).await {
                Ok(scopes) => scopes,
                Err(e) => {
                    warn!(client_id = %client.client_id, "Failed to load client scopes: {}", e);
                    Vec::new()
                }
            };
            services.push(ServiceInfo { client, scopes });
        }

        Ok(ServiceList {
            total: services.len(),
            services,
        })
    }

    /// A page of the client's access logs, newest first.
    pub async fn access_logs(
        &self,
        client_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> AppResult<Vec<ServiceAccessLog>> {
        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        self.access_logs.list_access_logs(client_id, limit, offset).await
    }

    /// Access statistics since `since` (see [`parse_since`]), default 24h.
    pub async fn statistics(&self, client_id: &str, since: Option<&str>) -> AppResult<AccessStatistics> {
        let now = Utc::now();
        let since = match since {
            Some(value) => parse_since(value, now)?,
            None => now - Duration::hours(24),
        };
        let stats = self.access_logs.access_statistics(client_id, since).await?;

        Ok(AccessStatistics {
            client_id: client_id.to_string(),
            since,
            total_requests: stats.total_requests,
            avg_response_time: stats.avg_response_time,
            error_count: stats.error_count,
            success_rate: stats.success_rate(),
        })
    }

    /// Remove expired service tokens; returns how many were removed.
    pub async fn cleanup_expired_tokens(&self) -> AppResult<u64> {
        self.tokens.cleanup_expired_tokens().await
    }
}

/// Parse a statistics window: `1h`, `24h`, `7d`, `30d` or an RFC 3339
/// timestamp.
pub fn parse_since(value: &str, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    match value {
        "1h" => Ok(now - Duration::hours(1)),
        "24h" => Ok(now - Duration::hours(24)),
        "7d" => Ok(now - Duration::days(7)),
        "30d" => Ok(now - Duration::days(30)),
        other => DateTime::parse_from_rfc3339(other)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| {
                AppError::validation(
                    "Invalid 'since' value. Use 1h, 24h, 7d, 30d or an RFC 3339 timestamp",
                )
            }),
    }
}
