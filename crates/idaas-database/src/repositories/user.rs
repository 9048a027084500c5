//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use idaas_core::error::{AppError, ErrorKind};
use idaas_core::result::AppResult;
use idaas_entity::user::{CreateUser, UpdateUser, User};

use super::insert_error;
use crate::store::UserStore;

/// Repository for end users.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, tenant_id, email, password_hash, profile) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.id)
        .bind(&data.tenant_id)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.profile)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            insert_error(
                e,
                format!("User with email {} already exists", data.email).as_str(),
                "Failed to create user",
            )
        })
    }

    async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_user_by_email(&self, tenant_id: &str, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE tenant_id = $1 AND email = $2")
            .bind(tenant_id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn list_users(&self, tenant_id: &str) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE tenant_id = $1 ORDER BY created_at",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    async fn update_user(&self, id: &str, data: &UpdateUser) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                password_hash = COALESCE($3, password_hash), \
                profile = COALESCE($4, profile), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.profile)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            insert_error(
                e,
                format!(
                    "User with email {} already exists",
                    data.email.as_deref().unwrap_or_default()
                )
                .as_str(),
                "Failed to update user",
            )
        })
    }
}
