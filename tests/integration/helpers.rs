//! Shared test helpers for integration tests.
//!
//! Every test gets its own application over a fresh in-memory store, so
//! tests run in parallel without cleanup.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde_json::Value;
use tower::ServiceExt;

use idaas_api::AppState;
use idaas_auth::jwt::Signer;
use idaas_auth::password::PasswordHasher;
use idaas_core::config::{AppConfig, JwtAlgorithm, JwtConfig, KeyMaterialConfig};
use idaas_database::store::ClientStore;
use idaas_database::{MemoryStore, Stores};
use idaas_entity::client::CreateInternalClient;

const USER_SECRET: &str = "integration-user-secret-0123456789abcdef";
const SERVICE_SECRET: &str = "integration-service-secret-0123456789abcdef";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for driving services directly
    pub state: AppState,
    /// Backing store, for seeding and inspection
    pub store: Arc<MemoryStore>,
}

/// Response status plus parsed JSON body (`Null` when empty).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

fn test_config() -> AppConfig {
    let keys = |secret: &str| KeyMaterialConfig {
        secret: Some(secret.to_string()),
        ..Default::default()
    };
    AppConfig {
        environment: "test".to_string(),
        jwt: JwtConfig {
            algorithm: JwtAlgorithm::Hs256,
            user: keys(USER_SECRET),
            service: keys(SERVICE_SECRET),
        },
        ..Default::default()
    }
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());

        let user_signer = Signer::from_config(config.jwt.algorithm, &config.jwt.user)
            .expect("Failed to build user signer");
        let service_signer = Signer::from_config(config.jwt.algorithm, &config.jwt.service)
            .expect("Failed to build service signer");
        let hasher = PasswordHasher::with_cost(1024, 1).expect("Failed to build hasher");

        let (state, worker) = AppState::build(
            config,
            Stores::memory(Arc::clone(&store)),
            user_signer,
            service_signer,
            hasher,
        )
        .expect("Failed to build state");
        tokio::spawn(worker.run());

        let router = idaas_api::build_app(state.clone());
        Self {
            router,
            state,
            store,
        }
    }

    /// Create scopes in the catalogue. Names already present (the default
    /// catalogue is seeded) are skipped.
    pub async fn create_scopes(&self, names: &[&str]) {
        let existing: Vec<String> = self
            .state
            .scopes
            .list_scopes()
            .await
            .expect("Failed to list scopes")
            .into_iter()
            .map(|s| s.name)
            .collect();

        for name in names.iter().filter(|n| !existing.iter().any(|e| e == *n)) {
            self.state
                .scopes
                .create_scope(name, None)
                .await
                .expect("Failed to create scope");
        }
    }

    /// Create an internal client with a known id and secret and grant it
    /// `scopes`, which must already exist.
    pub async fn create_client(&self, client_id: &str, secret: &str, scopes: &[&str]) {
        let hasher = PasswordHasher::with_cost(1024, 1).expect("Failed to build hasher");
        self.store
            .create_client(&CreateInternalClient {
                client_id: client_id.to_string(),
                client_secret_hash: hasher.hash(secret).expect("Failed to hash secret"),
                service_name: format!("{client_id} service"),
                description: None,
            })
            .await
            .expect("Failed to create client");
        for scope in scopes {
            self.grant(client_id, scope).await;
        }
    }

    pub async fn grant(&self, client_id: &str, scope: &str) {
        self.state
            .scopes
            .grant_scope(client_id, scope, Some("test"))
            .await
            .expect("Failed to grant scope");
    }

    /// Exchange client credentials at `/oauth/token` and return the token.
    pub async fn service_token(&self, client_id: &str, secret: &str) -> String {
        let response = self.oauth_token(client_id, secret, "client_credentials").await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Token exchange failed: {:?}",
            response.body
        );
        response.body["access_token"]
            .as_str()
            .expect("No access_token in token response")
            .to_string()
    }

    /// POST /oauth/token with Basic credentials and a form body.
    pub async fn oauth_token(&self, client_id: &str, secret: &str, grant_type: &str) -> TestResponse {
        let credentials = STANDARD.encode(format!("{client_id}:{secret}"));
        let req = Request::builder()
            .method("POST")
            .uri("/oauth/token")
            .header(header::AUTHORIZATION, format!("Basic {credentials}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("grant_type={grant_type}")))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Make a JSON request, optionally with a bearer credential.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = body
            .map(|b| Body::from(serde_json::to_vec(&b).expect("Failed to serialize body")))
            .unwrap_or_else(Body::empty);
        self.send(req.body(body).expect("Failed to build request")).await
    }

    /// Send a prepared request.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Wait until the access-log worker has stored at least `count` entries.
    pub async fn wait_for_access_logs(&self, count: usize) {
        for _ in 0..100 {
            if self.store.access_log_count().await >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("access log never reached {count} entries");
    }
}

/// Decode a JWT payload without verifying it.
pub fn jwt_payload(token: &str) -> Value {
    let payload = token.split('.').nth(1).expect("Token has no payload");
    let bytes = URL_SAFE_NO_PAD.decode(payload).expect("Payload is not base64url");
    serde_json::from_slice(&bytes).expect("Payload is not JSON")
}
