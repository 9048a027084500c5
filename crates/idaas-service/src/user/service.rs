//! End-user service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use idaas_auth::password::PasswordHasher;
use idaas_auth::password::generator::{generate_id, generate_opaque_token};
use idaas_auth::token::{IssuedToken, TokenManager};
use idaas_core::error::AppError;
use idaas_core::result::AppResult;
use idaas_database::store::UserStore;
use idaas_entity::user::{CreateUser, UpdateUser, User};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub profile: Option<serde_json::Value>,
}

/// Fields of a user that may be changed. Omitted fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile: Option<serde_json::Value>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub tenant_id: String,
    pub email: String,
    pub profile: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            profile: user.profile_or_empty(),
            id: user.id,
            tenant_id: user.tenant_id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Tokens handed out on login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: UserProfile,
    pub token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Handles end-user accounts within a tenant.
pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenManager>,
    hasher: Arc<PasswordHasher>,
    dummy_hash: String,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenManager>,
        hasher: Arc<PasswordHasher>,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash(&generate_opaque_token())?;
        Ok(Self {
            users,
            tokens,
            hasher,
            dummy_hash,
        })
    }

    pub async fn register(&self, tenant_id: &str, req: RegisterUserRequest) -> AppResult<UserProfile> {
        let email = normalize_email(&req.email)?;
        check_password(&req.password)?;
        if let Some(profile) = &req.profile {
            check_profile(profile)?;
        }

        let user = self
            .users
            .create_user(&CreateUser {
                id: generate_id("usr"),
                tenant_id: tenant_id.to_string(),
                email,
                password_hash: self.hasher.hash(&req.password)?,
                profile: req.profile,
            })
            .await?;

        info!(user_id = %user.id, tenant_id = %tenant_id, "User registered");
        Ok(user.into())
    }

    /// Verify a password and issue an access token plus a refresh token.
    /// Issuing the refresh token invalidates every earlier one.
    pub async fn login(
        &self,
        tenant_id: &str,
        email: &str,
        password: &str,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<LoginResult> {
        let rejected = || AppError::authentication("Invalid email or password");
        let email = email.trim().to_lowercase();

        let user = self.users.find_user_by_email(tenant_id, &email).await?;
        let Some((user, hash)) = user.and_then(|u| u.password_hash.clone().map(|h| (u, h))) else {
            self.hasher.verify(password, &self.dummy_hash)?;
            warn!(target: "audit", tenant_id = %tenant_id, "Login for unknown user");
            return Err(rejected());
        };

        if !self.hasher.verify(password, &hash)? {
            warn!(target: "audit", user_id = %user.id, "Login with wrong password");
            return Err(rejected());
        }

        info!(target: "audit", user_id = %user.id, tenant_id = %tenant_id, "User logged in");
        self.issue_tokens(user, client_ip, user_agent).await
    }

    /// Consume a refresh token and issue a fresh pair. The presented token
    /// is spent even if the user no longer belongs to `tenant_id`.
    pub async fn refresh(
        &self,
        tenant_id: &str,
        refresh_token: &str,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<LoginResult> {
        let user_id = self.tokens.consume_refresh_token(refresh_token).await?;
        let user = self
            .users
            .find_user(&user_id)
            .await?
            .filter(|u| u.tenant_id == tenant_id)
            .ok_or_else(|| AppError::token_invalid("Invalid or expired refresh token"))?;

        self.issue_tokens(user, client_ip, user_agent).await
    }

    async fn issue_tokens(
        &self,
        user: User,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<LoginResult> {
        let ttl = self.tokens.user_access_ttl();
        let access = self.tokens.issue_user_access_token(&user.principal(), ttl)?;
        let refresh = self
            .tokens
            .issue_user_refresh_token(&user.id, client_ip, user_agent)
            .await?;

        Ok(LoginResult {
            user: user.into(),
            token: access.token,
            refresh_token: refresh.token,
            expires_in: ttl.num_seconds(),
        })
    }

    /// Change email, password or profile of a user of `tenant_id`.
    pub async fn update_user(
        &self,
        tenant_id: &str,
        user_id: &str,
        req: UpdateUserRequest,
    ) -> AppResult<UserProfile> {
        self.find_in_tenant(tenant_id, user_id).await?;

        let email = req.email.as_deref().map(normalize_email).transpose()?;
        let password_hash = match &req.password {
            Some(password) => {
                check_password(password)?;
                Some(self.hasher.hash(password)?)
            }
            None => None,
        };
        if let Some(profile) = &req.profile {
            check_profile(profile)?;
        }

        let update = UpdateUser {
            email,
            password_hash,
            profile: req.profile,
        };
        if update.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }

        let user = self
            .users
            .update_user(user_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        info!(
            user_id = %user.id,
            tenant_id = %tenant_id,
            password_changed = update.password_hash.is_some(),
            "User updated"
        );
        Ok(user.into())
    }

    /// Issue an access token for a user of `tenant_id` on a service's
    /// behalf. No refresh token is created.
    pub async fn issue_access_token(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> AppResult<(IssuedToken, i64)> {
        let user = self.find_in_tenant(tenant_id, user_id).await?;
        let ttl = self.tokens.user_access_ttl();
        let issued = self.tokens.issue_user_access_token(&user.principal(), ttl)?;
        info!(target: "audit", user_id = %user.id, tenant_id = %tenant_id, "Access token issued for service");
        Ok((issued, ttl.num_seconds()))
    }

    pub async fn list_users(&self, tenant_id: &str) -> AppResult<Vec<UserProfile>> {
        Ok(self
            .users
            .list_users(tenant_id)
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }

    /// A user of `tenant_id`. Users of other tenants are reported as absent.
    pub async fn get_user(&self, tenant_id: &str, user_id: &str) -> AppResult<UserProfile> {
        self.find_in_tenant(tenant_id, user_id).await.map(UserProfile::from)
    }

    async fn find_in_tenant(&self, tenant_id: &str, user_id: &str) -> AppResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .filter(|u| u.tenant_id == tenant_id)
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email format"));
    }
    Ok(email)
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn check_profile(profile: &serde_json::Value) -> AppResult<()> {
    if !profile.is_object() {
        return Err(AppError::validation("Profile must be a JSON object"));
    }
    Ok(())
}
