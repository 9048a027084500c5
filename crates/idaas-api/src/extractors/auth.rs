//! Credential extractors: user bearer tokens, tenant API keys, and the
//! service caller resolved by the enforcement middleware.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::headers::authorization::{Basic, Bearer};
use axum_extra::headers::{Authorization, HeaderMapExt};

use idaas_core::error::AppError;
use idaas_entity::principal::Principal;
use idaas_entity::tenant::Tenant;
use idaas_service::context::RequestContext;

use super::client::ClientInfo;
use crate::state::AppState;

/// Bearer credential of the request.
///
/// A missing header and a header with the wrong scheme fail with different
/// messages.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    if !headers.contains_key(AUTHORIZATION) {
        return Err(AppError::authentication("Missing authorization header"));
    }
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::authentication("Invalid authorization header format"))
}

/// HTTP Basic credentials as `(username, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), AppError> {
    if !headers.contains_key(AUTHORIZATION) {
        return Err(AppError::authentication("Basic authorization required"));
    }
    headers
        .typed_get::<Authorization<Basic>>()
        .map(|auth| (auth.username().to_string(), auth.password().to_string()))
        .ok_or_else(|| AppError::authentication("Invalid basic authorization header"))
}

/// End user authenticated by a user access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// `(user_id, tenant_id)` of the caller.
    pub fn ids(&self) -> Result<(&str, &str), AppError> {
        match &self.0.principal {
            Some(Principal::EndUser { id, tenant_id, .. }) => Ok((id, tenant_id)),
            _ => Err(AppError::authentication("User authentication required")),
        }
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.tokens.verify_user_access_token(&token)?;
        let info = ClientInfo::from_parts(parts);

        let principal = Principal::EndUser {
            id: claims.sub,
            tenant_id: claims.tenant_id,
            email: claims.email,
        };
        Ok(AuthUser(RequestContext::authenticated(
            principal,
            Vec::new(),
            info.ip_address,
            info.user_agent,
        )))
    }
}

/// Tenant authenticated by its public API key, sent as
/// `Authorization: Bearer <public key>`.
#[derive(Debug, Clone)]
pub struct TenantKey(pub Tenant);

impl FromRequestParts<AppState> for TenantKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = bearer_token(&parts.headers)?;
        let tenant = state.tenants.validate_api_key(&key).await?;
        Ok(TenantKey(tenant))
    }
}

/// Internal service placed in the request by the service authentication
/// middleware. Rejects when the middleware did not run or did not
/// authenticate.
#[derive(Debug, Clone)]
pub struct ServiceCaller(pub RequestContext);

impl ServiceCaller {
    pub fn client_id(&self) -> &str {
        self.0.client_id().unwrap_or_default()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ServiceCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .filter(|ctx| ctx.client_id().is_some())
            .cloned()
            .map(ServiceCaller)
            .ok_or_else(|| AppError::authentication("Service authentication required"))
    }
}

/// Request context under optional authentication: authenticated when a
/// valid service token was presented, anonymous otherwise.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for MaybeCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = match parts.extensions.get::<RequestContext>() {
            Some(ctx) => ctx.clone(),
            None => {
                let info = ClientInfo::from_parts(parts);
                RequestContext::anonymous(info.ip_address, info.user_agent)
            }
        };
        Ok(MaybeCaller(ctx))
    }
}
