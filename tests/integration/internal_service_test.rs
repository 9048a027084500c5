//! Integration tests for the internal-service registry routes.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

/// Register a service over HTTP and return `(client_id, client_secret)`.
async fn register(app: &helpers::TestApp, name: &str, scopes: &[&str]) -> (String, String) {
    let response = app
        .request(
            "POST",
            "/v1/internal/services/register",
            Some(json!({ "service_name": name, "scopes": scopes })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    let data = &response.body["data"];
    (
        data["client_id"].as_str().unwrap().to_string(),
        data["client_secret"].as_str().unwrap().to_string(),
    )
}

async fn authenticate(app: &helpers::TestApp, client_id: &str, secret: &str) -> String {
    let response = app
        .request(
            "POST",
            "/v1/internal/services/authenticate",
            Some(json!({ "client_id": client_id, "client_secret": secret })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_authenticate_validate() {
    let app = helpers::TestApp::new().await;
    app.create_scopes(&["user:read"]).await;

    let (client_id, secret) = register(&app, "billing", &["user:read"]).await;
    let token = authenticate(&app, &client_id, &secret).await;

    let response = app
        .request(
            "POST",
            "/v1/internal/services/validate-token",
            Some(json!({ "token": token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["valid"], true);
    assert_eq!(data["client_id"], client_id.as_str());
    assert_eq!(data["scopes"], json!(["user:read"]));
}

#[tokio::test]
async fn test_register_with_unknown_scope_creates_nothing() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/v1/internal/services/register",
            Some(json!({ "service_name": "billing", "scopes": ["nope"] })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.state.registry.list_services().await.unwrap().services.is_empty());
}

#[tokio::test]
async fn test_register_requires_name() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/v1/internal/services/register",
            Some(json!({ "service_name": "" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_validate_garbage_token_is_not_an_error() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/v1/internal/services/validate-token",
            Some(json!({ "token": "not.a.jwt" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["valid"], false);
}

#[tokio::test]
async fn test_management_requires_service_token() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/v1/internal/services", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Missing authorization header");
}

#[tokio::test]
async fn test_grant_check_revoke_round() {
    let app = helpers::TestApp::new().await;
    app.create_scopes(&["user:read", "user:write"]).await;
    app.create_client("admin", "admin-secret", &[]).await;
    app.create_client("svc-b", "svc-b-secret", &[]).await;
    let token = app.service_token("admin", "admin-secret").await;

    let body = json!({ "client_id": "svc-b", "scope_name": "user:write" });

    let granted = app
        .request("POST", "/v1/internal/services/grant-scope", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(granted.status, StatusCode::OK);
    assert_eq!(granted.body["data"]["success"], true);

    let check = app
        .request("POST", "/v1/internal/services/check-permission", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(check.body["data"]["has_permission"], true);

    let revoked = app
        .request("POST", "/v1/internal/services/revoke-scope", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(revoked.status, StatusCode::OK);

    let check = app
        .request("POST", "/v1/internal/services/check-permission", Some(body), Some(&token))
        .await;
    assert_eq!(check.body["data"]["has_permission"], false);
    assert_eq!(check.body["data"]["message"], "Permission denied");
}

#[tokio::test]
async fn test_grant_to_unknown_client_is_not_found() {
    let app = helpers::TestApp::new().await;
    app.create_scopes(&["user:read"]).await;
    app.create_client("admin", "admin-secret", &[]).await;
    let token = app.service_token("admin", "admin-secret").await;

    let response = app
        .request(
            "POST",
            "/v1/internal/services/grant-scope",
            Some(json!({ "client_id": "ghost", "scope_name": "user:read" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_services_hides_secret_hash() {
    let app = helpers::TestApp::new().await;
    app.create_scopes(&["user:read"]).await;
    app.create_client("admin", "admin-secret", &["user:read"]).await;
    let token = app.service_token("admin", "admin-secret").await;

    let response = app.request("GET", "/v1/internal/services", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total"], 1);
    let service = &response.body["data"]["services"][0];
    assert_eq!(service["client_id"], "admin");
    assert_eq!(service["scopes"], json!(["user:read"]));
    assert!(service.get("client_secret_hash").is_none());
}

#[tokio::test]
async fn test_access_logs_and_statistics() {
    let app = helpers::TestApp::new().await;
    app.create_client("admin", "admin-secret", &[]).await;
    let token = app.service_token("admin", "admin-secret").await;

    app.request("GET", "/v1/internal/services", None, Some(&token)).await;
    app.request("GET", "/v1/internal/services", None, Some(&token)).await;
    app.wait_for_access_logs(2).await;

    let logs = app
        .request("GET", "/v1/internal/services/admin/logs?limit=10", None, Some(&token))
        .await;
    assert_eq!(logs.status, StatusCode::OK);
    let entries = logs.body["data"].as_array().unwrap();
    assert!(entries.len() >= 2);
    assert!(entries.iter().all(|e| e["client_id"] == "admin"));
    assert_eq!(entries[0]["endpoint"], "/v1/internal/services");

    app.wait_for_access_logs(3).await;
    let stats = app
        .request(
            "GET",
            "/v1/internal/services/admin/statistics?since=1h",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(stats.status, StatusCode::OK);
    assert!(stats.body["data"]["total_requests"].as_i64().unwrap() >= 3);
    assert_eq!(stats.body["data"]["error_count"], 0);
}

#[tokio::test]
async fn test_statistics_rejects_bad_window() {
    let app = helpers::TestApp::new().await;
    app.create_client("admin", "admin-secret", &[]).await;
    let token = app.service_token("admin", "admin-secret").await;

    let response = app
        .request(
            "GET",
            "/v1/internal/services/admin/statistics?since=fortnight",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cleanup_tokens_endpoint() {
    let app = helpers::TestApp::new().await;
    app.create_client("admin", "admin-secret", &[]).await;
    let token = app.service_token("admin", "admin-secret").await;

    let response = app
        .request("POST", "/v1/internal/services/cleanup-tokens", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    // The caller's own token is live and survives.
    assert_eq!(response.body["data"]["removed"], Value::from(0));
    let again = app.request("GET", "/v1/internal/services", None, Some(&token)).await;
    assert_eq!(again.status, StatusCode::OK);
}
