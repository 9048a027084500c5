//! Tenant service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use idaas_auth::password::PasswordHasher;
use idaas_auth::password::generator::{generate_api_key, generate_id};
use idaas_core::error::AppError;
use idaas_core::result::AppResult;
use idaas_database::store::TenantStore;
use idaas_entity::tenant::{CreateTenant, Tenant};

/// A newly created tenant, including its secret API key. Returned once.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTenant {
    pub id: String,
    pub name: String,
    pub public_key: String,
    pub secret_key: String,
    pub created_at: DateTime<Utc>,
}

/// Creates tenants and resolves them from API keys.
#[derive(Clone)]
pub struct TenantService {
    tenants: Arc<dyn TenantStore>,
    hasher: Arc<PasswordHasher>,
}

impl TenantService {
    /// Creates a new tenant service.
    pub fn new(tenants: Arc<dyn TenantStore>, hasher: Arc<PasswordHasher>) -> Self {
        Self { tenants, hasher }
    }

    pub async fn create_tenant(&self, name: &str) -> AppResult<CreatedTenant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Tenant name is required"));
        }

        let public_key = generate_api_key();
        let secret_key = generate_api_key();
        let tenant = self
            .tenants
            .create_tenant(&CreateTenant {
                id: generate_id("tnt"),
                name: name.to_string(),
                api_public_key: public_key.clone(),
                api_secret_key_hash: self.hasher.hash(&secret_key)?,
            })
            .await?;

        info!(target: "audit", tenant_id = %tenant.id, name = %tenant.name, "Tenant created");

        Ok(CreatedTenant {
            id: tenant.id,
            name: tenant.name,
            public_key,
            secret_key,
            created_at: tenant.created_at,
        })
    }

    pub async fn get_tenant(&self, id: &str) -> AppResult<Tenant> {
        self.tenants
            .find_tenant(id)
            .await?
            .ok_or_else(|| AppError::not_found("Tenant not found"))
    }

    pub async fn list_tenants(&self) -> AppResult<Vec<Tenant>> {
        self.tenants.list_tenants().await
    }

    /// Resolve the tenant owning a public API key.
    pub async fn validate_api_key(&self, api_key: &str) -> AppResult<Tenant> {
        if api_key.is_empty() {
            return Err(AppError::authentication("API key required"));
        }
        self.tenants
            .find_tenant_by_public_key(api_key)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid API key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idaas_core::error::ErrorKind;
    use idaas_database::MemoryStore;

    fn service() -> TenantService {
        TenantService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(PasswordHasher::with_cost(1024, 1).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_create_and_resolve_by_key() {
        let tenants = service();
        let created = tenants.create_tenant("Acme").await.unwrap();
        assert!(created.id.starts_with("tnt_"));
        assert_eq!(created.public_key.len(), 64);

        let tenant = tenants.validate_api_key(&created.public_key).await.unwrap();
        assert_eq!(tenant.id, created.id);
        assert_ne!(tenant.api_secret_key_hash, created.secret_key);
    }

    #[tokio::test]
    async fn test_unknown_key_rejected() {
        let tenants = service();
        let err = tenants.validate_api_key("nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_secret_key_is_not_an_api_key() {
        let tenants = service();
        let created = tenants.create_tenant("Acme").await.unwrap();
        assert!(tenants.validate_api_key(&created.secret_key).await.is_err());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let err = service().create_tenant("   ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
