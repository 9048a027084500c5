//! Scope and grant repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use idaas_core::error::{AppError, ErrorKind};
use idaas_core::result::AppResult;
use idaas_entity::scope::{CreateGrant, CreateScope, Scope};

use super::insert_error;
use crate::store::ScopeStore;

/// Repository for the scope catalogue and client grants.
#[derive(Debug, Clone)]
pub struct ScopeRepository {
    pool: PgPool,
}

impl ScopeRepository {
    /// Create a new scope repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScopeStore for ScopeRepository {
    async fn create_scope(&self, data: &CreateScope) -> AppResult<Scope> {
        sqlx::query_as::<_, Scope>(
            "INSERT INTO scopes (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, "Scope already exists", "Failed to create scope"))
    }

    async fn find_scope_by_name(&self, name: &str) -> AppResult<Option<Scope>> {
        sqlx::query_as::<_, Scope>("SELECT * FROM scopes WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find scope", e))
    }

    async fn list_scopes(&self) -> AppResult<Vec<Scope>> {
        sqlx::query_as::<_, Scope>("SELECT * FROM scopes ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list scopes", e))
    }

    async fn insert_grant(&self, data: &CreateGrant) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO client_scope_grants (client_id, scope_id, granted_by) \
             VALUES ($1, $2, $3) ON CONFLICT (client_id, scope_id) DO NOTHING",
        )
        .bind(&data.client_id)
        .bind(data.scope_id)
        .bind(&data.granted_by)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to grant scope", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_grant(&self, client_id: &str, scope_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM client_scope_grants WHERE client_id = $1 AND scope_id = $2",
        )
        .bind(client_id)
        .bind(scope_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke scope", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn client_has_scope(&self, client_id: &str, scope_name: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM client_scope_grants g \
             JOIN scopes s ON s.id = g.scope_id \
             WHERE g.client_id = $1 AND s.name = $2 AND s.is_active)",
        )
        .bind(client_id)
        .bind(scope_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check scope", e))
    }

    async fn client_scopes(&self, client_id: &str) -> AppResult<Vec<Scope>> {
        sqlx::query_as::<_, Scope>(
            "SELECT s.* FROM scopes s \
             JOIN client_scope_grants g ON g.scope_id = s.id \
             WHERE g.client_id = $1 AND s.is_active ORDER BY s.name",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load client scopes", e)
        })
    }
}
