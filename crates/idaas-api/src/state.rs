//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use idaas_auth::jwt::Signer;
use idaas_auth::password::PasswordHasher;
use idaas_auth::scope::ScopeAuthorizer;
use idaas_auth::token::TokenManager;
use idaas_core::config::AppConfig;
use idaas_core::result::AppResult;
use idaas_database::Stores;
use idaas_service::access_log::{AccessLogRecorder, AccessLogWorker};
use idaas_service::{InternalServiceRegistry, TenantService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheap handles, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    pub stores: Stores,
    pub access_log: AccessLogRecorder,

    // ── Auth ─────────────────────────────────────────────────
    pub tokens: Arc<TokenManager>,
    pub scopes: ScopeAuthorizer,

    // ── Services ─────────────────────────────────────────────
    pub registry: Arc<InternalServiceRegistry>,
    pub tenants: TenantService,
    pub users: Arc<UserService>,
}

impl AppState {
    /// Wire every service on top of the given stores and signers.
    ///
    /// Returns the access-log worker, which the caller must spawn.
    pub fn build(
        config: AppConfig,
        stores: Stores,
        user_signer: Signer,
        service_signer: Signer,
        hasher: PasswordHasher,
    ) -> AppResult<(Self, AccessLogWorker)> {
        let hasher = Arc::new(hasher);

        let tokens = Arc::new(TokenManager::new(
            Arc::new(user_signer),
            Arc::new(service_signer),
            Arc::clone(&stores.refresh_tokens),
            Arc::clone(&stores.service_tokens),
            Arc::clone(&stores.scopes),
            config.tokens.clone(),
        ));
        let scopes = ScopeAuthorizer::new(Arc::clone(&stores.scopes));

        let registry = Arc::new(InternalServiceRegistry::new(
            Arc::clone(&stores.clients),
            Arc::clone(&stores.access_logs),
            Arc::clone(&tokens),
            scopes.clone(),
            Arc::clone(&hasher),
        )?);
        let tenants = TenantService::new(Arc::clone(&stores.tenants), Arc::clone(&hasher));
        let users = Arc::new(UserService::new(
            Arc::clone(&stores.users),
            Arc::clone(&tokens),
            hasher,
        )?);

        let (access_log, worker) =
            AccessLogRecorder::new(Arc::clone(&stores.access_logs), &config.access_log);

        let state = Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            stores,
            access_log,
            tokens,
            scopes,
            registry,
            tenants,
            users,
        };
        Ok((state, worker))
    }
}
