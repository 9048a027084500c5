//! End-user auth handlers: register, login, refresh. All of them run on
//! behalf of the tenant named by the API key.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use idaas_core::error::AppError;
use idaas_service::user::{LoginResult, RegisterUserRequest, UserProfile};

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest, validate_body};
use crate::dto::response::ApiResponse;
use crate::extractors::{ClientInfo, TenantKey};
use crate::state::AppState;

/// POST /v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    TenantKey(tenant): TenantKey,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), AppError> {
    validate_body(&req)?;
    let user = state
        .users
        .register(
            &tenant.id,
            RegisterUserRequest {
                email: req.email,
                password: req.password,
                profile: req.profile,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// POST /v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    TenantKey(tenant): TenantKey,
    client: ClientInfo,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, AppError> {
    validate_body(&req)?;
    let result = state
        .users
        .login(
            &tenant.id,
            &req.email,
            &req.password,
            client.ip_address.as_deref(),
            client.user_agent.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    TenantKey(tenant): TenantKey,
    client: ClientInfo,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, AppError> {
    validate_body(&req)?;
    let result = state
        .users
        .refresh(
            &tenant.id,
            &req.refresh_token,
            client.ip_address.as_deref(),
            client.user_agent.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}
