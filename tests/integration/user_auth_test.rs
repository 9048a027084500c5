//! Integration tests for tenants and end-user authentication.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

/// Create a tenant over HTTP; returns `(tenant_id, public_key)`.
async fn create_tenant(app: &helpers::TestApp) -> (String, String) {
    let response = app
        .request("POST", "/v1/tenants", Some(json!({ "name": "Acme" })), None)
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let data = &response.body["data"];
    (
        data["id"].as_str().unwrap().to_string(),
        data["public_key"].as_str().unwrap().to_string(),
    )
}

async fn register(app: &helpers::TestApp, api_key: &str, email: &str, password: &str) -> Value {
    app.request(
        "POST",
        "/v1/auth/register",
        Some(json!({
            "email": email,
            "password": password,
            "profile": { "name": "Ada" },
        })),
        Some(api_key),
    )
    .await
    .body
}

async fn login(app: &helpers::TestApp, api_key: &str, email: &str, password: &str) -> helpers::TestResponse {
    app.request(
        "POST",
        "/v1/auth/login",
        Some(json!({ "email": email, "password": password })),
        Some(api_key),
    )
    .await
}

#[tokio::test]
async fn test_tenant_create_and_get() {
    let app = helpers::TestApp::new().await;
    let (tenant_id, public_key) = create_tenant(&app).await;
    assert!(tenant_id.starts_with("tnt_"));

    let response = app
        .request("GET", &format!("/v1/tenants/{tenant_id}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["api_public_key"], public_key.as_str());
    assert!(response.body["data"].get("api_secret_key_hash").is_none());

    let missing = app.request("GET", "/v1/tenants/tnt_missing", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_login_me() {
    let app = helpers::TestApp::new().await;
    let (tenant_id, key) = create_tenant(&app).await;

    let registered = register(&app, &key, "Ada@Example.com", "secret1").await;
    assert_eq!(registered["data"]["email"], "ada@example.com");
    assert_eq!(registered["data"]["tenant_id"], tenant_id.as_str());

    let response = login(&app, &key, "ada@example.com", "secret1").await;
    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["expires_in"], 900);
    let token = data["token"].as_str().unwrap();
    assert!(!data["refresh_token"].as_str().unwrap().is_empty());

    let claims = helpers::jwt_payload(token);
    assert_eq!(claims["tenant_id"], tenant_id.as_str());

    let me = app.request("GET", "/v1/users/me", None, Some(token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], "ada@example.com");
    assert_eq!(me.body["data"]["profile"]["name"], "Ada");
}

#[tokio::test]
async fn test_auth_routes_need_api_key() {
    let app = helpers::TestApp::new().await;

    let missing = app
        .request(
            "POST",
            "/v1/auth/register",
            Some(json!({ "email": "ada@example.com", "password": "secret1" })),
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let wrong = app
        .request(
            "POST",
            "/v1/auth/register",
            Some(json!({ "email": "ada@example.com", "password": "secret1" })),
            Some("not-a-key"),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], "Invalid API key");
}

#[tokio::test]
async fn test_register_validation_and_duplicate() {
    let app = helpers::TestApp::new().await;
    let (_, key) = create_tenant(&app).await;

    let short = app
        .request(
            "POST",
            "/v1/auth/register",
            Some(json!({ "email": "ada@example.com", "password": "12345" })),
            Some(&key),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.body["details"]["fields"], json!(["password"]));

    register(&app, &key, "ada@example.com", "secret1").await;
    let duplicate = app
        .request(
            "POST",
            "/v1/auth/register",
            Some(json!({ "email": "ada@example.com", "password": "secret1" })),
            Some(&key),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_failures_look_alike() {
    let app = helpers::TestApp::new().await;
    let (_, key) = create_tenant(&app).await;
    register(&app, &key, "ada@example.com", "secret1").await;

    let wrong = login(&app, &key, "ada@example.com", "nope-nope").await;
    let unknown = login(&app, &key, "bob@example.com", "nope-nope").await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn test_refresh_rotates_once() {
    let app = helpers::TestApp::new().await;
    let (_, key) = create_tenant(&app).await;
    register(&app, &key, "ada@example.com", "secret1").await;
    let first = login(&app, &key, "ada@example.com", "secret1").await;
    let refresh_token = first.body["data"]["refresh_token"].as_str().unwrap().to_string();

    let body = json!({ "refresh_token": refresh_token });
    let refreshed = app
        .request("POST", "/v1/auth/refresh", Some(body.clone()), Some(&key))
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert_ne!(refreshed.body["data"]["refresh_token"], body["refresh_token"]);

    let replay = app
        .request("POST", "/v1/auth/refresh", Some(body), Some(&key))
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_users_are_tenant_scoped() {
    let app = helpers::TestApp::new().await;
    let (_, key_a) = create_tenant(&app).await;
    let (_, key_b) = create_tenant(&app).await;
    let user = register(&app, &key_a, "ada@example.com", "secret1").await;
    let user_id = user["data"]["id"].as_str().unwrap();

    let own = app
        .request("GET", &format!("/v1/users/{user_id}"), None, Some(&key_a))
        .await;
    assert_eq!(own.status, StatusCode::OK);

    let other = app
        .request("GET", &format!("/v1/users/{user_id}"), None, Some(&key_b))
        .await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);

    let list = app.request("GET", "/v1/users", None, Some(&key_b)).await;
    assert_eq!(list.body["data"], json!([]));
}

#[tokio::test]
async fn test_me_rejects_service_token_and_api_key() {
    let app = helpers::TestApp::new().await;
    let (_, key) = create_tenant(&app).await;
    app.create_client("svc-a", "s3cret-example", &[]).await;
    let service_token = app.service_token("svc-a", "s3cret-example").await;

    let with_key = app.request("GET", "/v1/users/me", None, Some(&key)).await;
    let with_service = app
        .request("GET", "/v1/users/me", None, Some(&service_token))
        .await;

    assert_eq!(with_key.status, StatusCode::UNAUTHORIZED);
    assert_eq!(with_service.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["store"]["backend"], "memory");
    assert_eq!(response.body["data"]["environment"], "test");
}
