//! Tenant handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use idaas_core::error::AppError;
use idaas_entity::tenant::Tenant;
use idaas_service::tenant::CreatedTenant;

use crate::dto::request::{CreateTenantRequest, validate_body};
use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// POST /v1/tenants
pub async fn create_tenant(
    State(state): State<AppState>,
    Json(req): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedTenant>>), AppError> {
    validate_body(&req)?;
    let tenant = state.tenants.create_tenant(&req.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tenant))))
}

/// GET /v1/tenants/{id}
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Tenant>>, AppError> {
    let tenant = state.tenants.get_tenant(&id).await?;
    Ok(Json(ApiResponse::ok(tenant)))
}

/// GET /api/internal/tenants
pub async fn list_tenants(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Tenant>>>, AppError> {
    let tenants = state.tenants.list_tenants().await?;
    Ok(Json(ApiResponse::ok(tenants)))
}
