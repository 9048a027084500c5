//! Access log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One authenticated request made by an internal client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceAccessLog {
    pub id: i64,
    pub client_id: String,
    /// Request path.
    pub endpoint: String,
    pub method: String,
    pub status_code: i32,
    pub response_time_ms: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data required to append an access log entry.
#[derive(Debug, Clone)]
pub struct CreateAccessLog {
    pub client_id: String,
    pub endpoint: String,
    pub method: String,
    pub status_code: i32,
    pub response_time_ms: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
