//! Scope requirement a route declares.

use serde_json::json;

use idaas_core::error::AppError;
use idaas_core::result::AppResult;

use super::authorizer::ScopeAuthorizer;

/// What an authenticated caller must hold to reach a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRequirement {
    /// Any authenticated caller.
    Authenticated,
    /// One specific scope.
    Scope(String),
    /// At least one of the listed scopes.
    AnyOf(Vec<String>),
    /// Every listed scope.
    AllOf(Vec<String>),
}

impl ScopeRequirement {
    pub fn scope(name: impl Into<String>) -> Self {
        Self::Scope(name.into())
    }

    pub fn any_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyOf(names.into_iter().map(Into::into).collect())
    }

    pub fn all_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllOf(names.into_iter().map(Into::into).collect())
    }

    /// Checks the requirement against the client's current grants.
    ///
    /// Denials are authorization errors whose details name what is required
    /// and, for `AllOf`, what is missing.
    pub async fn check(&self, scopes: &ScopeAuthorizer, client_id: &str) -> AppResult<()> {
        match self {
            Self::Authenticated => Ok(()),
            Self::Scope(name) => {
                if scopes.has_scope(client_id, name).await? {
                    Ok(())
                } else {
                    Err(denied(json!({ "required_scope": name })))
                }
            }
            Self::AnyOf(names) => {
                if scopes.require_any(client_id, names.as_slice()).await {
                    Ok(())
                } else {
                    Err(denied(json!({ "required_scopes": names })))
                }
            }
            Self::AllOf(names) => {
                let missing = scopes.require_all(client_id, names.as_slice()).await?;
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(denied(json!({
                        "required_scopes": names,
                        "missing_scopes": missing,
                    })))
                }
            }
        }
    }
}

fn denied(details: serde_json::Value) -> AppError {
    AppError::authorization("Insufficient permissions").with_details(details)
}
