//! Route definitions for the IDaaS HTTP API.
//!
//! Routes are grouped by domain. Groups that need service authentication
//! are wrapped with [`guarded`] and their scope requirement; the state is
//! threaded through in [`crate::app::build_app`].

use axum::Router;
use axum::routing::{get, post, put};

use idaas_auth::scope::ScopeRequirement;

use crate::handlers;
use crate::middleware::{guarded, optional};
use crate::state::AppState;

/// Every route of the server.
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes())
        .merge(tenant_routes())
        .merge(user_auth_routes())
        .merge(user_routes())
        .merge(service_registry_routes(state))
        .merge(internal_api_routes(state))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Client-credentials exchange.
fn oauth_routes() -> Router<AppState> {
    Router::new().route("/oauth/token", post(handlers::oauth::token))
}

fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tenants", post(handlers::tenant::create_tenant))
        .route("/v1/tenants/{id}", get(handlers::tenant::get_tenant))
}

/// Tenant API key endpoints for end users.
fn user_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(handlers::auth::register))
        .route("/v1/auth/login", post(handlers::auth::login))
        .route("/v1/auth/refresh", post(handlers::auth::refresh))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users/me", get(handlers::user::me))
        .route("/v1/users", get(handlers::user::list_users))
        .route("/v1/users/{id}", get(handlers::user::get_user))
}

/// Service registry: registration and credential exchange are public,
/// management requires a service token.
fn service_registry_routes(state: &AppState) -> Router<AppState> {
    use handlers::internal;

    let public = Router::new()
        .route("/v1/internal/services/register", post(internal::register))
        .route("/v1/internal/services/authenticate", post(internal::authenticate))
        .route("/v1/internal/services/validate-token", post(internal::validate_token));

    let authenticated = Router::new()
        .route("/v1/internal/services", get(internal::list_services))
        .route("/v1/internal/services/grant-scope", post(internal::grant_scope))
        .route("/v1/internal/services/revoke-scope", post(internal::revoke_scope))
        .route(
            "/v1/internal/services/check-permission",
            post(internal::check_permission),
        )
        .route(
            "/v1/internal/services/cleanup-tokens",
            post(internal::cleanup_tokens),
        )
        .route("/v1/internal/services/{client_id}/logs", get(internal::access_logs))
        .route(
            "/v1/internal/services/{client_id}/statistics",
            get(internal::statistics),
        );

    public.merge(guarded(authenticated, state, ScopeRequirement::Authenticated))
}

/// Scope-protected API for other services.
fn internal_api_routes(state: &AppState) -> Router<AppState> {
    use handlers::{demo, internal, tenant};

    let users = Router::new()
        .route("/api/internal/users", get(demo::list_users))
        .route("/api/internal/users/{id}", get(demo::get_user));

    let user_writes = Router::new()
        .route("/api/internal/users", post(demo::create_user))
        .route("/api/internal/users/{id}", put(demo::update_user));

    let user_tokens = Router::new()
        .route("/api/internal/auth/token", post(demo::issue_user_token))
        .route("/api/internal/auth/validate", post(demo::validate_user_token));

    let tenants = Router::new()
        .route("/api/internal/tenants", get(tenant::list_tenants))
        .route("/api/internal/tenants/{id}", get(demo::get_tenant));

    let admin = Router::new()
        .route("/api/internal/admin/services", get(internal::list_services))
        .route(
            "/api/internal/admin/services/grant-scope",
            post(internal::grant_scope),
        )
        .route(
            "/api/internal/admin/services/revoke-scope",
            post(internal::revoke_scope),
        );

    let any = Router::new().route("/api/internal/composite/any", get(demo::any_scope));
    let all = Router::new().route("/api/internal/composite/all", get(demo::all_scopes));
    let public = Router::new().route("/api/internal/optional/public", get(demo::optional_public));

    Router::new()
        .merge(guarded(users, state, ScopeRequirement::scope("user:read")))
        .merge(guarded(user_writes, state, ScopeRequirement::scope("user:write")))
        .merge(guarded(user_tokens, state, ScopeRequirement::scope("auth:token")))
        .merge(guarded(tenants, state, ScopeRequirement::scope("tenant:read")))
        .merge(guarded(admin, state, ScopeRequirement::scope("internal:admin")))
        .merge(guarded(
            any,
            state,
            ScopeRequirement::any_of(["user:read", "tenant:read"]),
        ))
        .merge(guarded(
            all,
            state,
            ScopeRequirement::all_of(["user:read", "user:write"]),
        ))
        .merge(optional(public, state))
}
