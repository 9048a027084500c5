//! Authenticated identities.

use serde::{Deserialize, Serialize};

/// An authenticated identity attached to a request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    /// An end user of a tenant application.
    EndUser {
        id: String,
        tenant_id: String,
        email: String,
    },
    /// An internal service using the client-credentials grant.
    InternalService {
        client_id: String,
        service_name: String,
    },
}

impl Principal {
    /// The subject identifier carried in tokens for this principal.
    pub fn subject(&self) -> &str {
        match self {
            Self::EndUser { id, .. } => id,
            Self::InternalService { client_id, .. } => client_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_per_kind() {
        let user = Principal::EndUser {
            id: "usr_1".into(),
            tenant_id: "tnt_1".into(),
            email: "a@example.com".into(),
        };
        let service = Principal::InternalService {
            client_id: "svc-a".into(),
            service_name: "billing".into(),
        };
        assert_eq!(user.subject(), "usr_1");
        assert_eq!(service.subject(), "svc-a");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let service = Principal::InternalService {
            client_id: "svc-a".into(),
            service_name: "billing".into(),
        };
        let json = serde_json::to_value(&service).unwrap();
        assert_eq!(json["kind"], "internal_service");
    }
}
