//! Tenant repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use idaas_core::error::{AppError, ErrorKind};
use idaas_core::result::AppResult;
use idaas_entity::tenant::{CreateTenant, Tenant};

use super::insert_error;
use crate::store::TenantStore;

/// Repository for tenants.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Create a new tenant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for TenantRepository {
    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name, api_public_key, api_secret_key_hash) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.id)
        .bind(&data.name)
        .bind(&data.api_public_key)
        .bind(&data.api_secret_key_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, "Tenant already exists", "Failed to create tenant"))
    }

    async fn find_tenant(&self, id: &str) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tenant", e))
    }

    async fn find_tenant_by_public_key(&self, key: &str) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE api_public_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find tenant by API key", e)
            })
    }

    async fn list_tenants(&self) -> AppResult<Vec<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tenants", e))
    }
}
