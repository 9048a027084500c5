//! User handlers.

use axum::Json;
use axum::extract::{Path, State};

use idaas_core::error::AppError;
use idaas_service::user::UserProfile;

use crate::dto::response::ApiResponse;
use crate::extractors::{AuthUser, TenantKey};
use crate::state::AppState;

/// GET /v1/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let (user_id, tenant_id) = auth.ids()?;
    let user = state.users.get_user(tenant_id, user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// GET /v1/users
pub async fn list_users(
    State(state): State<AppState>,
    TenantKey(tenant): TenantKey,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>, AppError> {
    let users = state.users.list_users(&tenant.id).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    TenantKey(tenant): TenantKey,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let user = state.users.get_user(&tenant.id, &id).await?;
    Ok(Json(ApiResponse::ok(user)))
}
