//! Internal client repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use idaas_core::error::{AppError, ErrorKind};
use idaas_core::result::AppResult;
use idaas_entity::client::{CreateInternalClient, InternalClient};

use super::insert_error;
use crate::store::ClientStore;

/// Repository for internal-service clients.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    /// Create a new client repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for ClientRepository {
    async fn create_client(&self, data: &CreateInternalClient) -> AppResult<InternalClient> {
        sqlx::query_as::<_, InternalClient>(
            "INSERT INTO internal_clients (client_id, client_secret_hash, service_name, description) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.client_id)
        .bind(&data.client_secret_hash)
        .bind(&data.service_name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, "Client already exists", "Failed to create client"))
    }

    async fn find_client(&self, client_id: &str) -> AppResult<Option<InternalClient>> {
        sqlx::query_as::<_, InternalClient>("SELECT * FROM internal_clients WHERE client_id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find client", e))
    }

    async fn list_clients(&self) -> AppResult<Vec<InternalClient>> {
        sqlx::query_as::<_, InternalClient>("SELECT * FROM internal_clients ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list clients", e))
    }

    async fn set_client_active(&self, client_id: &str, active: bool) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE internal_clients SET is_active = $2, updated_at = NOW() WHERE client_id = $1",
        )
        .bind(client_id)
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update client", e))?;
        Ok(result.rows_affected() > 0)
    }
}
