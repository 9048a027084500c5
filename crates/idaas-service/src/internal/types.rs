//! Request and result types of the internal-service registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use idaas_entity::client::InternalClient;

/// Input of a service registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterServiceRequest {
    pub service_name: String,
    pub description: Option<String>,
    /// Scopes to grant right away.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// A newly registered service. The only place the secret is ever returned.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredService {
    pub client_id: String,
    pub client_secret: String,
    pub service_name: String,
    pub description: Option<String>,
    pub scopes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub message: String,
    pub warning: String,
}

/// Outcome of a grant or revoke.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeChange {
    pub success: bool,
    pub message: String,
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionCheck {
    pub has_permission: bool,
    pub message: String,
}

/// A registered service with its current scopes.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    #[serde(flatten)]
    pub client: InternalClient,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceList {
    pub services: Vec<ServiceInfo>,
    pub total: usize,
}

/// Aggregated access statistics of one client over a window.
#[derive(Debug, Clone, Serialize)]
pub struct AccessStatistics {
    pub client_id: String,
    pub since: DateTime<Utc>,
    pub total_requests: i64,
    pub avg_response_time: f64,
    pub error_count: i64,
    /// Percentage of requests below status 400.
    pub success_rate: f64,
}
