//! Service token repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use idaas_core::error::{AppError, ErrorKind};
use idaas_core::result::AppResult;
use idaas_entity::token::{CreateServiceToken, ServiceToken};

use crate::store::ServiceTokenStore;

/// Repository for the live service-token set.
#[derive(Debug, Clone)]
pub struct ServiceTokenRepository {
    pool: PgPool,
}

impl ServiceTokenRepository {
    /// Create a new service token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceTokenStore for ServiceTokenRepository {
    // Two issuances in the same second sign identical claims, so the hash
    // can already be live.
    async fn insert_service_token(&self, data: &CreateServiceToken) -> AppResult<ServiceToken> {
        sqlx::query_as::<_, ServiceToken>(
            "INSERT INTO service_tokens (token_hash, client_id, scopes, expires_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (token_hash) DO UPDATE \
             SET expires_at = GREATEST(service_tokens.expires_at, EXCLUDED.expires_at) \
             RETURNING *",
        )
        .bind(&data.token_hash)
        .bind(&data.client_id)
        .bind(&data.scopes)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store service token", e))
    }

    async fn find_live_service_token(&self, token_hash: &str) -> AppResult<Option<ServiceToken>> {
        sqlx::query_as::<_, ServiceToken>(
            "SELECT * FROM service_tokens WHERE token_hash = $1 AND expires_at > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find service token", e))
    }

    async fn delete_service_token(&self, token_hash: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM service_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to revoke service token", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_service_tokens(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM service_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired service tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
