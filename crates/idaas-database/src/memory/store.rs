//! Mutex-guarded implementation of every credential store trait.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use idaas_core::error::AppError;
use idaas_core::result::AppResult;
use idaas_entity::access_log::{ClientStatistics, CreateAccessLog, ServiceAccessLog};
use idaas_entity::client::{CreateInternalClient, InternalClient};
use idaas_entity::scope::{ClientScopeGrant, CreateGrant, CreateScope, Scope};
use idaas_entity::tenant::{CreateTenant, Tenant};
use idaas_entity::token::{CreateRefreshToken, CreateServiceToken, RefreshToken, ServiceToken};
use idaas_entity::user::{CreateUser, UpdateUser, User};

use crate::store::{
    AccessLogStore, ClientStore, DEFAULT_SCOPES, RefreshTokenStore, ScopeStore,
    ServiceTokenStore, StoreHealth, TenantStore, UserStore,
};

#[derive(Debug, Default)]
struct InnerState {
    tenants: HashMap<String, Tenant>,
    users: HashMap<String, User>,
    refresh_tokens: HashMap<String, RefreshToken>,
    clients: HashMap<String, InternalClient>,
    /// Keyed by name so listing is ordered.
    scopes: BTreeMap<String, Scope>,
    next_scope_id: i64,
    grants: HashMap<(String, i64), ClientScopeGrant>,
    service_tokens: HashMap<String, ServiceToken>,
    access_logs: Vec<ServiceAccessLog>,
    next_log_id: i64,
}

impl InnerState {
    fn insert_scope(&mut self, data: &CreateScope) -> Scope {
        self.next_scope_id += 1;
        let scope = Scope {
            id: self.next_scope_id,
            name: data.name.clone(),
            description: data.description.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.scopes.insert(scope.name.clone(), scope.clone());
        scope
    }

    fn granted_scopes<'a>(&'a self, client_id: &'a str) -> impl Iterator<Item = &'a Scope> + 'a {
        self.scopes.values().filter(move |s| {
            s.is_active && self.grants.contains_key(&(client_id.to_string(), s.id))
        })
    }
}

/// In-memory credential store. Each operation holds one lock for its whole
/// duration, which gives the same atomicity the PostgreSQL statements do.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<InnerState>,
}

impl MemoryStore {
    /// Create a store seeded with the default scope catalogue.
    pub fn new() -> Self {
        let mut state = InnerState::default();
        for (name, description) in DEFAULT_SCOPES {
            state.insert_scope(&CreateScope {
                name: (*name).to_string(),
                description: Some((*description).to_string()),
            });
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Number of refresh tokens held for a user, expired ones included.
    pub async fn refresh_token_count(&self, user_id: &str) -> usize {
        let state = self.state.lock().await;
        state
            .refresh_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .count()
    }

    /// Number of rows in the service-token set, expired ones included.
    pub async fn service_token_count(&self) -> usize {
        self.state.lock().await.service_tokens.len()
    }

    /// Number of access log entries recorded so far.
    pub async fn access_log_count(&self) -> usize {
        self.state.lock().await.access_logs.len()
    }

    /// Store a refresh token row verbatim, bypassing rotation.
    pub async fn put_refresh_token(&self, token: RefreshToken) {
        let mut state = self.state.lock().await;
        state.refresh_tokens.insert(token.token_hash.clone(), token);
    }

    /// Store a service token row verbatim.
    pub async fn put_service_token(&self, token: ServiceToken) {
        let mut state = self.state.lock().await;
        state.service_tokens.insert(token.token_hash.clone(), token);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant> {
        let mut state = self.state.lock().await;
        if state.tenants.contains_key(&data.id)
            || state
                .tenants
                .values()
                .any(|t| t.api_public_key == data.api_public_key)
        {
            return Err(AppError::conflict("Tenant already exists"));
        }
        let now = Utc::now();
        let tenant = Tenant {
            id: data.id.clone(),
            name: data.name.clone(),
            api_public_key: data.api_public_key.clone(),
            api_secret_key_hash: data.api_secret_key_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        state.tenants.insert(tenant.id.clone(), tenant.clone());
        Ok(tenant)
    }

    async fn find_tenant(&self, id: &str) -> AppResult<Option<Tenant>> {
        Ok(self.state.lock().await.tenants.get(id).cloned())
    }

    async fn find_tenant_by_public_key(&self, key: &str) -> AppResult<Option<Tenant>> {
        let state = self.state.lock().await;
        Ok(state
            .tenants
            .values()
            .find(|t| t.api_public_key == key)
            .cloned())
    }

    async fn list_tenants(&self) -> AppResult<Vec<Tenant>> {
        let state = self.state.lock().await;
        let mut tenants: Vec<Tenant> = state.tenants.values().cloned().collect();
        tenants.sort_by_key(|t| t.created_at);
        Ok(tenants)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|u| u.tenant_id == data.tenant_id && u.email == data.email)
        {
            return Err(AppError::conflict(format!(
                "User with email {} already exists",
                data.email
            )));
        }
        let now = Utc::now();
        let user = User {
            id: data.id.clone(),
            tenant_id: data.tenant_id.clone(),
            email: data.email.clone(),
            password_hash: Some(data.password_hash.clone()),
            profile: data.profile.clone(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, tenant_id: &str, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.tenant_id == tenant_id && u.email == email)
            .cloned())
    }

    async fn list_users(&self, tenant_id: &str) -> AppResult<Vec<User>> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_user(&self, id: &str, data: &UpdateUser) -> AppResult<Option<User>> {
        let mut state = self.state.lock().await;
        let Some(tenant_id) = state.users.get(id).map(|u| u.tenant_id.clone()) else {
            return Ok(None);
        };
        if let Some(email) = &data.email {
            let taken = state
                .users
                .values()
                .any(|u| u.id != id && u.tenant_id == tenant_id && &u.email == email);
            if taken {
                return Err(AppError::conflict(format!(
                    "User with email {email} already exists"
                )));
            }
        }

        let Some(user) = state.users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(email) = &data.email {
            user.email = email.clone();
        }
        if let Some(hash) = &data.password_hash {
            user.password_hash = Some(hash.clone());
        }
        if let Some(profile) = &data.profile {
            user.profile = Some(profile.clone());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn rotate_refresh_token(&self, data: &CreateRefreshToken) -> AppResult<RefreshToken> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&data.user_id) {
            return Err(AppError::not_found(format!("User {} not found", data.user_id)));
        }
        state.refresh_tokens.retain(|_, t| t.user_id != data.user_id);
        let token = RefreshToken {
            token_hash: data.token_hash.clone(),
            user_id: data.user_id.clone(),
            client_ip: data.client_ip.clone(),
            user_agent: data.user_agent.clone(),
            expires_at: data.expires_at,
            created_at: Utc::now(),
        };
        state
            .refresh_tokens
            .insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn consume_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let live = state
            .refresh_tokens
            .get(token_hash)
            .is_some_and(|t| !t.is_expired_at(now));
        if !live {
            return Ok(None);
        }
        Ok(state.refresh_tokens.remove(token_hash))
    }

    async fn delete_expired_refresh_tokens(&self) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn create_client(&self, data: &CreateInternalClient) -> AppResult<InternalClient> {
        let mut state = self.state.lock().await;
        if state.clients.contains_key(&data.client_id) {
            return Err(AppError::conflict("Client already exists"));
        }
        let now = Utc::now();
        let client = InternalClient {
            client_id: data.client_id.clone(),
            client_secret_hash: data.client_secret_hash.clone(),
            service_name: data.service_name.clone(),
            description: data.description.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state
            .clients
            .insert(client.client_id.clone(), client.clone());
        Ok(client)
    }

    async fn find_client(&self, client_id: &str) -> AppResult<Option<InternalClient>> {
        Ok(self.state.lock().await.clients.get(client_id).cloned())
    }

    async fn list_clients(&self) -> AppResult<Vec<InternalClient>> {
        let state = self.state.lock().await;
        let mut clients: Vec<InternalClient> = state.clients.values().cloned().collect();
        clients.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        Ok(clients)
    }

    async fn set_client_active(&self, client_id: &str, active: bool) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.clients.get_mut(client_id) {
            Some(client) => {
                client.is_active = active;
                client.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ScopeStore for MemoryStore {
    async fn create_scope(&self, data: &CreateScope) -> AppResult<Scope> {
        let mut state = self.state.lock().await;
        if state.scopes.contains_key(&data.name) {
            return Err(AppError::conflict("Scope already exists"));
        }
        Ok(state.insert_scope(data))
    }

    async fn find_scope_by_name(&self, name: &str) -> AppResult<Option<Scope>> {
        Ok(self.state.lock().await.scopes.get(name).cloned())
    }

    async fn list_scopes(&self) -> AppResult<Vec<Scope>> {
        Ok(self.state.lock().await.scopes.values().cloned().collect())
    }

    async fn insert_grant(&self, data: &CreateGrant) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let key = (data.client_id.clone(), data.scope_id);
        if state.grants.contains_key(&key) {
            return Ok(false);
        }
        state.grants.insert(
            key,
            ClientScopeGrant {
                client_id: data.client_id.clone(),
                scope_id: data.scope_id,
                granted_by: data.granted_by.clone(),
                granted_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn delete_grant(&self, client_id: &str, scope_id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .grants
            .remove(&(client_id.to_string(), scope_id))
            .is_some())
    }

    async fn client_has_scope(&self, client_id: &str, scope_name: &str) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state.scopes.get(scope_name).is_some_and(|s| {
            s.is_active && state.grants.contains_key(&(client_id.to_string(), s.id))
        }))
    }

    async fn client_scopes(&self, client_id: &str) -> AppResult<Vec<Scope>> {
        let state = self.state.lock().await;
        Ok(state.granted_scopes(client_id).cloned().collect())
    }
}

#[async_trait]
impl ServiceTokenStore for MemoryStore {
    async fn insert_service_token(&self, data: &CreateServiceToken) -> AppResult<ServiceToken> {
        let mut state = self.state.lock().await;
        let token = state
            .service_tokens
            .entry(data.token_hash.clone())
            .and_modify(|t| t.expires_at = t.expires_at.max(data.expires_at))
            .or_insert_with(|| ServiceToken {
                token_hash: data.token_hash.clone(),
                client_id: data.client_id.clone(),
                scopes: data.scopes.clone(),
                expires_at: data.expires_at,
                created_at: Utc::now(),
            });
        Ok(token.clone())
    }

    async fn find_live_service_token(&self, token_hash: &str) -> AppResult<Option<ServiceToken>> {
        let state = self.state.lock().await;
        let now = Utc::now();
        Ok(state
            .service_tokens
            .get(token_hash)
            .filter(|t| t.expires_at > now)
            .cloned())
    }

    async fn delete_service_token(&self, token_hash: &str) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state.service_tokens.remove(token_hash).is_some())
    }

    async fn delete_expired_service_tokens(&self) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let before = state.service_tokens.len();
        state.service_tokens.retain(|_, t| t.expires_at > now);
        Ok((before - state.service_tokens.len()) as u64)
    }
}

#[async_trait]
impl AccessLogStore for MemoryStore {
    async fn insert_access_log(&self, data: &CreateAccessLog) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.next_log_id += 1;
        let entry = ServiceAccessLog {
            id: state.next_log_id,
            client_id: data.client_id.clone(),
            endpoint: data.endpoint.clone(),
            method: data.method.clone(),
            status_code: data.status_code,
            response_time_ms: data.response_time_ms,
            ip_address: data.ip_address.clone(),
            user_agent: data.user_agent.clone(),
            created_at: Utc::now(),
        };
        state.access_logs.push(entry);
        Ok(())
    }

    async fn list_access_logs(
        &self,
        client_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ServiceAccessLog>> {
        let state = self.state.lock().await;
        Ok(state
            .access_logs
            .iter()
            .rev()
            .filter(|l| l.client_id == client_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn access_statistics(
        &self,
        client_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<ClientStatistics> {
        let state = self.state.lock().await;
        let window: Vec<&ServiceAccessLog> = state
            .access_logs
            .iter()
            .filter(|l| l.client_id == client_id && l.created_at >= since)
            .collect();

        let total = window.len() as i64;
        if total == 0 {
            return Ok(ClientStatistics::default());
        }
        let sum: i64 = window.iter().map(|l| l.response_time_ms).sum();
        let errors = window.iter().filter(|l| l.status_code >= 400).count() as i64;
        Ok(ClientStatistics {
            total_requests: total,
            avg_response_time: sum as f64 / total as f64,
            error_count: errors,
        })
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
