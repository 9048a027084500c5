//! Internal-service registry handlers.
//!
//! `register`, `authenticate` and `validate_token` are public; everything
//! else runs behind service authentication.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::json;

use idaas_auth::token::{ServiceAccessToken, TokenValidation};
use idaas_core::error::AppError;
use idaas_entity::access_log::ServiceAccessLog;
use idaas_service::internal::{
    AccessStatistics, PermissionCheck, RegisterServiceRequest as NewService, RegisteredService,
    ScopeChange, ServiceList,
};

use crate::dto::request::{
    AuthenticateServiceRequest, RegisterServiceRequest, ScopeRequest, ValidateTokenRequest,
    validate_body,
};
use crate::dto::response::ApiResponse;
use crate::extractors::{LogQuery, ServiceCaller, SinceQuery};
use crate::state::AppState;

/// POST /v1/internal/services/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterServiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredService>>), AppError> {
    validate_body(&req)?;
    let registered = state
        .registry
        .register_service(NewService {
            service_name: req.service_name,
            description: req.description,
            scopes: req.scopes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(registered))))
}

/// POST /v1/internal/services/authenticate
pub async fn authenticate(
    State(state): State<AppState>,
    Json(req): Json<AuthenticateServiceRequest>,
) -> Result<Json<ApiResponse<ServiceAccessToken>>, AppError> {
    validate_body(&req)?;
    let token = state
        .registry
        .authenticate_service(&req.client_id, &req.client_secret)
        .await?;
    Ok(Json(ApiResponse::ok(token)))
}

/// POST /v1/internal/services/validate-token
///
/// An invalid token is a normal answer (`valid: false`), not an error.
pub async fn validate_token(
    State(state): State<AppState>,
    Json(req): Json<ValidateTokenRequest>,
) -> Result<Json<ApiResponse<TokenValidation>>, AppError> {
    validate_body(&req)?;
    let validation = state.registry.validate_token(&req.token).await?;
    Ok(Json(ApiResponse::ok(validation)))
}

/// GET /v1/internal/services
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ServiceList>>, AppError> {
    let services = state.registry.list_services().await?;
    Ok(Json(ApiResponse::ok(services)))
}

/// POST /v1/internal/services/grant-scope
pub async fn grant_scope(
    State(state): State<AppState>,
    caller: ServiceCaller,
    Json(req): Json<ScopeRequest>,
) -> Result<Json<ApiResponse<ScopeChange>>, AppError> {
    validate_body(&req)?;
    let change = state
        .registry
        .grant_scope(&req.client_id, &req.scope_name, Some(caller.client_id()))
        .await?;
    Ok(Json(ApiResponse::ok(change)))
}

/// POST /v1/internal/services/revoke-scope
pub async fn revoke_scope(
    State(state): State<AppState>,
    caller: ServiceCaller,
    Json(req): Json<ScopeRequest>,
) -> Result<Json<ApiResponse<ScopeChange>>, AppError> {
    validate_body(&req)?;
    let change = state
        .registry
        .revoke_scope(&req.client_id, &req.scope_name)
        .await?;
    tracing::info!(
        target: "audit",
        revoked_by = %caller.client_id(),
        client_id = %req.client_id,
        scope = %req.scope_name,
        "Scope revoked"
    );
    Ok(Json(ApiResponse::ok(change)))
}

/// POST /v1/internal/services/check-permission
pub async fn check_permission(
    State(state): State<AppState>,
    Json(req): Json<ScopeRequest>,
) -> Result<Json<ApiResponse<PermissionCheck>>, AppError> {
    validate_body(&req)?;
    let check = state
        .registry
        .check_permission(&req.client_id, &req.scope_name)
        .await?;
    Ok(Json(ApiResponse::ok(check)))
}

/// GET /v1/internal/services/{client_id}/logs
pub async fn access_logs(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<ApiResponse<Vec<ServiceAccessLog>>>, AppError> {
    let logs = state
        .registry
        .access_logs(&client_id, query.limit, query.offset)
        .await?;
    Ok(Json(ApiResponse::ok(logs)))
}

/// GET /v1/internal/services/{client_id}/statistics
pub async fn statistics(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(query): Query<SinceQuery>,
) -> Result<Json<ApiResponse<AccessStatistics>>, AppError> {
    let stats = state
        .registry
        .statistics(&client_id, query.since.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// POST /v1/internal/services/cleanup-tokens
pub async fn cleanup_tokens(
    State(state): State<AppState>,
    caller: ServiceCaller,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let removed = state.registry.cleanup_expired_tokens().await?;
    tracing::info!(client_id = %caller.client_id(), removed, "Expired service tokens cleaned up");
    Ok(Json(ApiResponse::ok(json!({
        "message": "Expired tokens cleaned up",
        "removed": removed,
    }))))
}
