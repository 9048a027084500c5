//! Scope authorization engine.

use std::sync::Arc;

use idaas_core::error::AppError;
use idaas_core::result::AppResult;
use idaas_database::store::ScopeStore;
use idaas_entity::scope::{CreateGrant, CreateScope, Scope};

/// Grants, revokes and checks scopes of internal-service clients.
///
/// Every check goes to the store; nothing is cached, so a concurrent grant
/// may or may not be observed by a check already in flight.
#[derive(Clone)]
pub struct ScopeAuthorizer {
    store: Arc<dyn ScopeStore>,
}

impl std::fmt::Debug for ScopeAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeAuthorizer").finish_non_exhaustive()
    }
}

impl ScopeAuthorizer {
    /// Creates a new authorizer.
    pub fn new(store: Arc<dyn ScopeStore>) -> Self {
        Self { store }
    }

    async fn resolve(&self, scope_name: &str) -> AppResult<Scope> {
        self.store
            .find_scope_by_name(scope_name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Scope '{scope_name}' not found")))
    }

    /// Grant a scope by name. Returns `false` when it was already granted.
    pub async fn grant_scope(
        &self,
        client_id: &str,
        scope_name: &str,
        granted_by: Option<&str>,
    ) -> AppResult<bool> {
        let scope = self.resolve(scope_name).await?;
        let created = self
            .store
            .insert_grant(&CreateGrant {
                client_id: client_id.to_string(),
                scope_id: scope.id,
                granted_by: granted_by.map(str::to_string),
            })
            .await?;

        tracing::info!(
            target: "audit",
            client_id = %client_id,
            scope = %scope_name,
            granted_by = granted_by.unwrap_or("-"),
            created,
            "Scope granted"
        );
        Ok(created)
    }

    /// Revoke a scope by name. Revoking an ungranted scope returns `false`.
    pub async fn revoke_scope(&self, client_id: &str, scope_name: &str) -> AppResult<bool> {
        let scope = self.resolve(scope_name).await?;
        let removed = self.store.delete_grant(client_id, scope.id).await?;

        tracing::info!(
            target: "audit",
            client_id = %client_id,
            scope = %scope_name,
            removed,
            "Scope revoked"
        );
        Ok(removed)
    }

    /// Single existence check.
    pub async fn has_scope(&self, client_id: &str, scope_name: &str) -> AppResult<bool> {
        self.store.client_has_scope(client_id, scope_name).await
    }

    /// True if the client holds at least one of `scopes`, checked in order.
    ///
    /// A store failure for one scope counts as "not held" and the scan
    /// continues.
    pub async fn require_any<S: AsRef<str>>(&self, client_id: &str, scopes: &[S]) -> bool {
        for scope in scopes {
            let scope = scope.as_ref();
            match self.has_scope(client_id, scope).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        client_id = %client_id,
                        scope = %scope,
                        "Scope lookup failed, treating as not held: {}",
                        e
                    );
                }
            }
        }
        false
    }

    /// Every scope in `scopes` the client lacks, in input order. A store
    /// failure aborts the whole check.
    pub async fn require_all<S: AsRef<str>>(
        &self,
        client_id: &str,
        scopes: &[S],
    ) -> AppResult<Vec<String>> {
        let mut missing = Vec::new();
        for scope in scopes {
            let scope = scope.as_ref();
            if !self.has_scope(client_id, scope).await? {
                missing.push(scope.to_string());
            }
        }
        Ok(missing)
    }

    /// Names of the client's active scopes, ordered.
    pub async fn client_scopes(&self, client_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .store
            .client_scopes(client_id)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect())
    }

    /// Adds a scope to the catalogue.
    pub async fn create_scope(&self, name: &str, description: Option<&str>) -> AppResult<Scope> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Scope name must not be empty"));
        }
        self.store
            .create_scope(&CreateScope {
                name: name.to_string(),
                description: description.map(str::to_string),
            })
            .await
    }

    /// The full scope catalogue.
    pub async fn list_scopes(&self) -> AppResult<Vec<Scope>> {
        self.store.list_scopes().await
    }
}
