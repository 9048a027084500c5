//! Internal-service enforcement middleware.
//!
//! `require_service_auth` authenticates the bearer service token and
//! records an access-log entry once the response is produced;
//! `enforce_scopes` then checks the route's [`ScopeRequirement`] against the
//! client's current grants. `optional_service_auth` never rejects.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self as axum_middleware, Next};
use axum::response::Response;

use idaas_auth::scope::ScopeRequirement;
use idaas_core::error::AppError;
use idaas_core::result::AppResult;
use idaas_database::store::ClientStore;
use idaas_entity::access_log::CreateAccessLog;
use idaas_entity::principal::Principal;
use idaas_service::context::RequestContext;

use crate::extractors::auth::bearer_token;
use crate::extractors::client::ClientInfo;
use crate::state::AppState;

/// Resolve a bearer service token into a request context.
async fn authenticate(state: &AppState, token: &str, info: ClientInfo) -> AppResult<RequestContext> {
    let validation = state.tokens.validate_service_token(token).await?;
    if !validation.valid {
        return Err(AppError::token_invalid(validation.message));
    }
    let client_id = validation
        .client_id
        .ok_or_else(|| AppError::token_invalid("Token has no subject"))?;

    let client = state
        .stores
        .clients
        .find_client(&client_id)
        .await?
        .ok_or_else(|| AppError::token_invalid("Client no longer exists"))?;
    if !client.is_active {
        return Err(AppError::token_invalid("Client is inactive"));
    }

    Ok(RequestContext::authenticated(
        Principal::InternalService {
            client_id: client.client_id,
            service_name: client.service_name,
        },
        validation.scopes,
        info.ip_address,
        info.user_agent,
    ))
}

/// Reject requests without a valid service token.
pub async fn require_service_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let info = ClientInfo::from_parts(&parts);
    let token = bearer_token(&parts.headers)?;
    request = Request::from_parts(parts, body);

    let ctx = authenticate(&state, &token, info).await.inspect_err(|e| {
        tracing::debug!(path = %request.uri().path(), "Service authentication failed: {}", e);
    })?;

    let entry = CreateAccessLog {
        client_id: ctx.client_id().unwrap_or_default().to_string(),
        endpoint: request.uri().path().to_string(),
        method: request.method().to_string(),
        status_code: 0,
        response_time_ms: 0,
        ip_address: ctx.ip_address.clone(),
        user_agent: ctx.user_agent.clone(),
    };

    request.extensions_mut().insert(ctx);
    let response = next.run(request).await;

    state
        .access_log
        .record(CreateAccessLog {
            status_code: i32::from(response.status().as_u16()),
            response_time_ms: start.elapsed().as_millis() as i64,
            ..entry
        })
        .await;

    Ok(response)
}

/// A route's scope requirement together with the state to check it against.
#[derive(Clone)]
pub struct ScopeGuard {
    state: AppState,
    requirement: Arc<ScopeRequirement>,
}

impl ScopeGuard {
    pub fn new(state: AppState, requirement: ScopeRequirement) -> Self {
        Self {
            state,
            requirement: Arc::new(requirement),
        }
    }
}

/// Check the route's scope requirement. Must run after
/// [`require_service_auth`].
pub async fn enforce_scopes(
    State(guard): State<ScopeGuard>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_id = request
        .extensions()
        .get::<RequestContext>()
        .and_then(|ctx| ctx.client_id())
        .map(str::to_string)
        .ok_or_else(|| AppError::authentication("Service authentication required"))?;

    if let Err(e) = guard.requirement.check(&guard.state.scopes, &client_id).await {
        tracing::warn!(
            target: "audit",
            client_id = %client_id,
            path = %request.uri().path(),
            requirement = ?guard.requirement,
            "Scope check denied"
        );
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Attach a request context whether or not a valid service token was
/// presented. Never rejects.
pub async fn optional_service_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let info = ClientInfo::from_parts(&parts);
    let token = bearer_token(&parts.headers).ok();
    request = Request::from_parts(parts, body);

    let ctx = match token {
        Some(token) => match authenticate(&state, &token, info.clone()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::debug!("Optional authentication ignored: {}", e);
                RequestContext::anonymous(info.ip_address, info.user_agent)
            }
        },
        None => RequestContext::anonymous(info.ip_address, info.user_agent),
    };

    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Put every route of `router` behind service authentication and
/// `requirement`.
pub fn guarded(
    router: Router<AppState>,
    state: &AppState,
    requirement: ScopeRequirement,
) -> Router<AppState> {
    router
        .route_layer(axum_middleware::from_fn_with_state(
            ScopeGuard::new(state.clone(), requirement),
            enforce_scopes,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_service_auth,
        ))
}

/// Put every route of `router` behind optional service authentication.
pub fn optional(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        optional_service_auth,
    ))
}
