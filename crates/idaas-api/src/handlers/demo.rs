//! Scope-protected internal API, consumed by other services with a
//! service access token. Each group is mounted behind its own scope
//! requirement in the router.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use idaas_auth::jwt::UserClaims;
use idaas_core::error::AppError;
use idaas_entity::tenant::Tenant;
use idaas_service::user::{RegisterUserRequest, UpdateUserRequest, UserProfile};

use crate::dto::request::{
    IssueUserTokenRequest, RegisterRequest, TenantFilter, UpdateUserBody, ValidateTokenRequest,
    validate_body,
};
use crate::dto::response::{ApiResponse, MessageResponse, UserTokenResponse};
use crate::extractors::MaybeCaller;
use crate::state::AppState;

/// GET /api/internal/users?tenant_id=
pub async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<TenantFilter>,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>, AppError> {
    let users = state.users.list_users(&filter.tenant_id).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/internal/users/{id}?tenant_id=
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(filter): Query<TenantFilter>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let user = state.users.get_user(&filter.tenant_id, &id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/internal/users?tenant_id=
pub async fn create_user(
    State(state): State<AppState>,
    Query(filter): Query<TenantFilter>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), AppError> {
    validate_body(&req)?;
    state.tenants.get_tenant(&filter.tenant_id).await?;
    let user = state
        .users
        .register(
            &filter.tenant_id,
            RegisterUserRequest {
                email: req.email,
                password: req.password,
                profile: req.profile,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// PUT /api/internal/users/{id}?tenant_id=
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(filter): Query<TenantFilter>,
    Json(req): Json<UpdateUserBody>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    validate_body(&req)?;
    let user = state
        .users
        .update_user(
            &filter.tenant_id,
            &id,
            UpdateUserRequest {
                email: req.email,
                password: req.password,
                profile: req.profile,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/internal/auth/token?tenant_id=
pub async fn issue_user_token(
    State(state): State<AppState>,
    Query(filter): Query<TenantFilter>,
    Json(req): Json<IssueUserTokenRequest>,
) -> Result<Json<ApiResponse<UserTokenResponse>>, AppError> {
    validate_body(&req)?;
    let (issued, expires_in) = state
        .users
        .issue_access_token(&filter.tenant_id, &req.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(UserTokenResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_in,
    })))
}

/// POST /api/internal/auth/validate
pub async fn validate_user_token(
    State(state): State<AppState>,
    Json(req): Json<ValidateTokenRequest>,
) -> Result<Json<ApiResponse<UserClaims>>, AppError> {
    validate_body(&req)?;
    let claims = state.tokens.verify_user_access_token(&req.token)?;
    Ok(Json(ApiResponse::ok(claims)))
}

/// GET /api/internal/tenants/{id}
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Tenant>>, AppError> {
    let tenant = state.tenants.get_tenant(&id).await?;
    Ok(Json(ApiResponse::ok(tenant)))
}

/// GET /api/internal/composite/any
pub async fn any_scope() -> Json<ApiResponse<MessageResponse>> {
    Json(ApiResponse::ok(MessageResponse {
        message: "Access granted with any scope".to_string(),
    }))
}

/// GET /api/internal/composite/all
pub async fn all_scopes() -> Json<ApiResponse<MessageResponse>> {
    Json(ApiResponse::ok(MessageResponse {
        message: "Access granted with all scopes".to_string(),
    }))
}

/// GET /api/internal/optional/public
pub async fn optional_public(MaybeCaller(ctx): MaybeCaller) -> Json<ApiResponse<Value>> {
    let body = match ctx.client_id() {
        Some(client_id) => json!({
            "message": "Public endpoint with optional auth",
            "authenticated": true,
            "client_id": client_id,
            "scopes": ctx.scopes,
        }),
        None => json!({
            "message": "Public endpoint without auth",
            "authenticated": false,
        }),
    };
    Json(ApiResponse::ok(body))
}
