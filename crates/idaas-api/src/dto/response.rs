//! Response DTOs.

use serde::Serialize;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Body of `POST /oauth/token`.
#[derive(Debug, Clone, Serialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    /// Space-separated scope snapshot.
    pub scope: String,
}

/// User access token issued to a service on a tenant's behalf.
#[derive(Debug, Clone, Serialize)]
pub struct UserTokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Service liveness.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub uptime_seconds: u64,
    pub store: StoreHealthResponse,
    pub access_log_dropped: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreHealthResponse {
    pub backend: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
