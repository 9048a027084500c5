//! Request context carrying the resolved principal and its scopes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use idaas_entity::principal::Principal;

/// Context for the current request.
///
/// Built by the enforcement middleware. An unauthenticated context is a
/// normal value: routes behind optional authentication branch on it.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// The authenticated principal, if any.
    pub principal: Option<Principal>,
    /// Scopes carried by the presented token.
    pub scopes: Vec<String>,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context with no principal.
    pub fn anonymous(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            principal: None,
            scopes: Vec::new(),
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Context for an authenticated principal.
    pub fn authenticated(
        principal: Principal,
        scopes: Vec<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            principal: Some(principal),
            scopes,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Client ID when the caller is an internal service.
    pub fn client_id(&self) -> Option<&str> {
        match &self.principal {
            Some(Principal::InternalService { client_id, .. }) => Some(client_id),
            _ => None,
        }
    }

    /// User ID when the caller is an end user.
    pub fn user_id(&self) -> Option<&str> {
        match &self.principal {
            Some(Principal::EndUser { id, .. }) => Some(id),
            _ => None,
        }
    }

    /// Whether the token carried `scope` at issuance.
    pub fn has_token_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_context() {
        let ctx = RequestContext::authenticated(
            Principal::InternalService {
                client_id: "svc-a".into(),
                service_name: "a".into(),
            },
            vec!["read".into()],
            None,
            None,
        );
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.client_id(), Some("svc-a"));
        assert_eq!(ctx.user_id(), None);
        assert!(ctx.has_token_scope("read"));
        assert!(!ctx.has_token_scope("write"));
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = RequestContext::anonymous(Some("127.0.0.1".into()), None);
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.client_id(), None);
    }
}
