//! Credential store traits.
//!
//! Every mutation is a single atomic statement (or, for refresh-token
//! rotation, a single transaction) so callers need no locking of their own.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use idaas_core::result::AppResult;
use idaas_entity::access_log::{ClientStatistics, CreateAccessLog, ServiceAccessLog};
use idaas_entity::client::{CreateInternalClient, InternalClient};
use idaas_entity::scope::{CreateGrant, CreateScope, Scope};
use idaas_entity::tenant::{CreateTenant, Tenant};
use idaas_entity::token::{CreateRefreshToken, CreateServiceToken, RefreshToken, ServiceToken};
use idaas_entity::user::{CreateUser, UpdateUser, User};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{
    AccessLogRepository, ClientRepository, RefreshTokenRepository, ScopeRepository,
    ServiceTokenRepository, TenantRepository, UserRepository,
};

/// Scopes every fresh store starts with.
pub const DEFAULT_SCOPES: &[(&str, &str)] = &[
    ("user:read", "Read user records"),
    ("user:write", "Create and update user records"),
    ("tenant:read", "Read tenant records"),
    ("auth:token", "Issue and validate user tokens on behalf of a tenant"),
    ("internal:admin", "Manage internal services and their scopes"),
];

/// Tenant persistence.
#[async_trait]
pub trait TenantStore: Send + Sync + 'static {
    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant>;
    async fn find_tenant(&self, id: &str) -> AppResult<Option<Tenant>>;
    async fn find_tenant_by_public_key(&self, key: &str) -> AppResult<Option<Tenant>>;
    async fn list_tenants(&self) -> AppResult<Vec<Tenant>>;
}

/// End-user persistence. Email is unique per tenant.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Fails with a conflict error when the email is already taken.
    async fn create_user(&self, data: &CreateUser) -> AppResult<User>;
    async fn find_user(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, tenant_id: &str, email: &str) -> AppResult<Option<User>>;
    async fn list_users(&self, tenant_id: &str) -> AppResult<Vec<User>>;
    /// Returns `None` when no such user exists. Fails with a conflict error
    /// when the new email is taken within the tenant.
    async fn update_user(&self, id: &str, data: &UpdateUser) -> AppResult<Option<User>>;
}

/// Refresh tokens, indexed directly by hash.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Delete every refresh token of `data.user_id` and insert `data`, as one
    /// atomic unit.
    async fn rotate_refresh_token(&self, data: &CreateRefreshToken) -> AppResult<RefreshToken>;

    /// Delete and return the unexpired token with this hash, if any.
    async fn consume_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    async fn delete_expired_refresh_tokens(&self) -> AppResult<u64>;
}

/// Internal-service client persistence.
#[async_trait]
pub trait ClientStore: Send + Sync + 'static {
    async fn create_client(&self, data: &CreateInternalClient) -> AppResult<InternalClient>;
    async fn find_client(&self, client_id: &str) -> AppResult<Option<InternalClient>>;
    async fn list_clients(&self) -> AppResult<Vec<InternalClient>>;
    /// Returns `false` when no such client exists.
    async fn set_client_active(&self, client_id: &str, active: bool) -> AppResult<bool>;
}

/// Scope catalogue and the client/scope grant relation.
#[async_trait]
pub trait ScopeStore: Send + Sync + 'static {
    async fn create_scope(&self, data: &CreateScope) -> AppResult<Scope>;
    async fn find_scope_by_name(&self, name: &str) -> AppResult<Option<Scope>>;
    async fn list_scopes(&self) -> AppResult<Vec<Scope>>;

    /// Returns `false` when the grant already existed.
    async fn insert_grant(&self, data: &CreateGrant) -> AppResult<bool>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_grant(&self, client_id: &str, scope_id: i64) -> AppResult<bool>;

    /// Single existence check against active scopes.
    async fn client_has_scope(&self, client_id: &str, scope_name: &str) -> AppResult<bool>;

    /// Active scopes granted to a client, ordered by name.
    async fn client_scopes(&self, client_id: &str) -> AppResult<Vec<Scope>>;
}

/// Live service tokens. Absence of a hash means revoked or unknown.
#[async_trait]
pub trait ServiceTokenStore: Send + Sync + 'static {
    async fn insert_service_token(&self, data: &CreateServiceToken) -> AppResult<ServiceToken>;
    async fn find_live_service_token(&self, token_hash: &str) -> AppResult<Option<ServiceToken>>;
    async fn delete_service_token(&self, token_hash: &str) -> AppResult<bool>;
    async fn delete_expired_service_tokens(&self) -> AppResult<u64>;
}

/// Access logs of authenticated internal-service requests.
#[async_trait]
pub trait AccessLogStore: Send + Sync + 'static {
    async fn insert_access_log(&self, data: &CreateAccessLog) -> AppResult<()>;
    /// Newest first.
    async fn list_access_logs(
        &self,
        client_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ServiceAccessLog>>;
    async fn access_statistics(
        &self,
        client_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<ClientStatistics>;
}

/// Liveness of the backing store.
#[async_trait]
pub trait StoreHealth: Send + Sync + 'static {
    async fn ping(&self) -> AppResult<()>;
    fn backend(&self) -> &'static str;
}

/// Handles to every store family, shared by the services.
#[derive(Clone)]
pub struct Stores {
    pub tenants: Arc<dyn TenantStore>,
    pub users: Arc<dyn UserStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub clients: Arc<dyn ClientStore>,
    pub scopes: Arc<dyn ScopeStore>,
    pub service_tokens: Arc<dyn ServiceTokenStore>,
    pub access_logs: Arc<dyn AccessLogStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(db: DatabasePool) -> Self {
        let pool: PgPool = db.pool().clone();
        Self {
            tenants: Arc::new(TenantRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            refresh_tokens: Arc::new(RefreshTokenRepository::new(pool.clone())),
            clients: Arc::new(ClientRepository::new(pool.clone())),
            scopes: Arc::new(ScopeRepository::new(pool.clone())),
            service_tokens: Arc::new(ServiceTokenRepository::new(pool.clone())),
            access_logs: Arc::new(AccessLogRepository::new(pool)),
            health: Arc::new(db),
        }
    }

    /// Every family served by one in-memory store.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            tenants: store.clone(),
            users: store.clone(),
            refresh_tokens: store.clone(),
            clients: store.clone(),
            scopes: store.clone(),
            service_tokens: store.clone(),
            access_logs: store.clone(),
            health: store,
        }
    }
}
