//! Access log repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use idaas_core::error::{AppError, ErrorKind};
use idaas_core::result::AppResult;
use idaas_entity::access_log::{ClientStatistics, CreateAccessLog, ServiceAccessLog};

use crate::store::AccessLogStore;

/// Repository for service access logs.
#[derive(Debug, Clone)]
pub struct AccessLogRepository {
    pool: PgPool,
}

impl AccessLogRepository {
    /// Create a new access log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogStore for AccessLogRepository {
    async fn insert_access_log(&self, data: &CreateAccessLog) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO service_access_logs \
             (client_id, endpoint, method, status_code, response_time_ms, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&data.client_id)
        .bind(&data.endpoint)
        .bind(&data.method)
        .bind(data.status_code)
        .bind(data.response_time_ms)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert access log", e))?;
        Ok(())
    }

    async fn list_access_logs(
        &self,
        client_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ServiceAccessLog>> {
        sqlx::query_as::<_, ServiceAccessLog>(
            "SELECT * FROM service_access_logs WHERE client_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list access logs", e))
    }

    async fn access_statistics(
        &self,
        client_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<ClientStatistics> {
        sqlx::query_as::<_, ClientStatistics>(
            "SELECT COUNT(*)::BIGINT AS total_requests, \
             COALESCE(AVG(response_time_ms), 0)::FLOAT8 AS avg_response_time, \
             COUNT(*) FILTER (WHERE status_code >= 400)::BIGINT AS error_count \
             FROM service_access_logs WHERE client_id = $1 AND created_at >= $2",
        )
        .bind(client_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to compute access statistics", e)
        })
    }
}
