//! Refresh token repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use idaas_core::error::{AppError, ErrorKind};
use idaas_core::result::AppResult;
use idaas_entity::token::{CreateRefreshToken, RefreshToken};

use crate::store::RefreshTokenStore;

/// Repository for refresh tokens, keyed by token hash.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    async fn rotate_refresh_token(&self, data: &CreateRefreshToken) -> AppResult<RefreshToken> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Serializes concurrent rotations for the same user.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(&data.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock user", e))?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", data.user_id)))?;

        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(&data.user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete refresh tokens", e)
            })?;

        let token = sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (token_hash, user_id, client_ip, user_agent, expires_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.token_hash)
        .bind(&data.user_id)
        .bind(&data.client_ip)
        .bind(&data.user_agent)
        .bind(data.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store refresh token", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit refresh token", e)
        })?;

        Ok(token)
    }

    async fn consume_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "DELETE FROM refresh_tokens WHERE token_hash = $1 AND expires_at > NOW() RETURNING *",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume refresh token", e)
        })
    }

    async fn delete_expired_refresh_tokens(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired refresh tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
