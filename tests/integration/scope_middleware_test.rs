//! Integration tests for scope enforcement on the internal API.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

/// App with the demo scopes and one client holding `scopes`; returns the
/// app and a token for that client.
async fn setup(scopes: &[&str]) -> (helpers::TestApp, String) {
    let app = helpers::TestApp::new().await;
    app.create_scopes(&["user:read", "user:write", "tenant:read", "internal:admin"])
        .await;
    app.create_client("svc-a", "s3cret-example", scopes).await;
    let token = app.service_token("svc-a", "s3cret-example").await;
    (app, token)
}

#[tokio::test]
async fn test_missing_and_malformed_header() {
    let (app, _) = setup(&[]).await;

    let missing = app.request("GET", "/api/internal/tenants", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["message"], "Missing authorization header");

    let req = Request::builder()
        .uri("/api/internal/tenants")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let malformed = app.send(req).await;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);
    assert_eq!(malformed.body["message"], "Invalid authorization header format");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let (app, _) = setup(&[]).await;

    let response = app
        .request("GET", "/api/internal/tenants", None, Some("not.a.jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_user_token_is_not_a_service_token() {
    let (app, _) = setup(&[]).await;
    let tenant = app.state.tenants.create_tenant("Acme").await.unwrap();
    app.state
        .users
        .register(
            &tenant.id,
            idaas_service::user::RegisterUserRequest {
                email: "ada@example.com".into(),
                password: "secret1".into(),
                profile: None,
            },
        )
        .await
        .unwrap();
    let login = app
        .state
        .users
        .login(&tenant.id, "ada@example.com", "secret1", None, None)
        .await
        .unwrap();

    let response = app
        .request("GET", "/api/internal/tenants", None, Some(&login.token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_single_scope_granted_and_denied() {
    let (app, token) = setup(&["tenant:read"]).await;

    let allowed = app.request("GET", "/api/internal/tenants", None, Some(&token)).await;
    assert_eq!(allowed.status, StatusCode::OK);

    let denied = app
        .request("GET", "/api/internal/users?tenant_id=tnt_x", None, Some(&token))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["error"], "FORBIDDEN");
    assert_eq!(denied.body["details"]["required_scope"], "user:read");
}

#[tokio::test]
async fn test_revocation_applies_to_existing_token() {
    let (app, token) = setup(&["tenant:read"]).await;

    app.state.scopes.revoke_scope("svc-a", "tenant:read").await.unwrap();
    let response = app.request("GET", "/api/internal/tenants", None, Some(&token)).await;

    // The token still carries the scope; enforcement reads current grants.
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_revoked_token_rejected() {
    let (app, token) = setup(&["tenant:read"]).await;

    assert!(app.state.tokens.revoke_service_token(&token).await.unwrap());
    let response = app.request("GET", "/api/internal/tenants", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Token has been revoked");
}

#[tokio::test]
async fn test_any_of() {
    let (app, token) = setup(&["tenant:read"]).await;
    let response = app
        .request("GET", "/api/internal/composite/any", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["message"], "Access granted with any scope");

    let (app, token) = setup(&["user:write"]).await;
    let response = app
        .request("GET", "/api/internal/composite/any", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body["details"]["required_scopes"],
        json!(["user:read", "tenant:read"])
    );
}

#[tokio::test]
async fn test_all_of_reports_missing() {
    let (app, token) = setup(&["user:read"]).await;
    let response = app
        .request("GET", "/api/internal/composite/all", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["details"]["missing_scopes"], json!(["user:write"]));

    app.grant("svc-a", "user:write").await;
    let response = app
        .request("GET", "/api/internal/composite/all", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_need_admin_scope() {
    let (app, token) = setup(&["user:read"]).await;

    let response = app
        .request("GET", "/api/internal/admin/services", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    app.grant("svc-a", "internal:admin").await;
    let response = app
        .request(
            "POST",
            "/api/internal/admin/services/grant-scope",
            Some(json!({ "client_id": "svc-a", "scope_name": "tenant:read" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.state.scopes.has_scope("svc-a", "tenant:read").await.unwrap());
}

#[tokio::test]
async fn test_optional_auth() {
    let (app, token) = setup(&["user:read"]).await;

    let anonymous = app
        .request("GET", "/api/internal/optional/public", None, None)
        .await;
    assert_eq!(anonymous.status, StatusCode::OK);
    assert_eq!(anonymous.body["data"]["authenticated"], false);

    let invalid = app
        .request("GET", "/api/internal/optional/public", None, Some("garbage"))
        .await;
    assert_eq!(invalid.status, StatusCode::OK);
    assert_eq!(invalid.body["data"]["authenticated"], false);

    let authenticated = app
        .request("GET", "/api/internal/optional/public", None, Some(&token))
        .await;
    assert_eq!(authenticated.status, StatusCode::OK);
    assert_eq!(authenticated.body["data"]["client_id"], "svc-a");
    assert_eq!(authenticated.body["data"]["scopes"], json!(["user:read"]));
}

#[tokio::test]
async fn test_denied_requests_are_logged() {
    let (app, token) = setup(&[]).await;

    let response = app.request("GET", "/api/internal/tenants", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    app.wait_for_access_logs(1).await;
    let stats = app.state.registry.statistics("svc-a", None).await.unwrap();
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.error_count, 1);
}

#[tokio::test]
async fn test_user_writes_need_user_write() {
    let (app, reader) = setup(&["user:read"]).await;
    app.create_client("svc-w", "writer-secret", &["user:read", "user:write"])
        .await;
    let writer = app.service_token("svc-w", "writer-secret").await;
    let tenant = app.state.tenants.create_tenant("Acme").await.unwrap();
    let users_path = format!("/api/internal/users?tenant_id={}", tenant.id);
    let body = json!({ "email": "ada@example.com", "password": "secret1" });

    let denied = app
        .request("POST", &users_path, Some(body.clone()), Some(&reader))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["details"]["required_scope"], "user:write");

    let created = app.request("POST", &users_path, Some(body), Some(&writer)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let user_id = created.body["data"]["id"].as_str().unwrap().to_string();

    // GET on the same path still only needs user:read.
    let listed = app.request("GET", &users_path, None, Some(&reader)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 1);

    let user_path = format!("/api/internal/users/{user_id}?tenant_id={}", tenant.id);
    let update = json!({ "profile": { "name": "Ada" } });
    let denied = app
        .request("PUT", &user_path, Some(update.clone()), Some(&reader))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let updated = app.request("PUT", &user_path, Some(update), Some(&writer)).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["profile"]["name"], "Ada");
    assert_eq!(updated.body["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_create_user_for_unknown_tenant() {
    let (app, token) = setup(&["user:write"]).await;

    let response = app
        .request(
            "POST",
            "/api/internal/users?tenant_id=tnt_missing",
            Some(json!({ "email": "ada@example.com", "password": "secret1" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_token_routes_need_auth_token() {
    let (app, without) = setup(&["user:read"]).await;
    app.create_client("svc-t", "token-secret", &["auth:token"]).await;
    let with = app.service_token("svc-t", "token-secret").await;

    let tenant = app.state.tenants.create_tenant("Acme").await.unwrap();
    let user = app
        .state
        .users
        .register(
            &tenant.id,
            idaas_service::user::RegisterUserRequest {
                email: "ada@example.com".into(),
                password: "secret1".into(),
                profile: None,
            },
        )
        .await
        .unwrap();
    let token_path = format!("/api/internal/auth/token?tenant_id={}", tenant.id);
    let body = json!({ "user_id": user.id });

    let denied = app
        .request("POST", &token_path, Some(body.clone()), Some(&without))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["details"]["required_scope"], "auth:token");

    let issued = app.request("POST", &token_path, Some(body), Some(&with)).await;
    assert_eq!(issued.status, StatusCode::OK);
    assert_eq!(issued.body["data"]["expires_in"], 900);
    let user_token = issued.body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(helpers::jwt_payload(&user_token)["tenant_id"], tenant.id.as_str());

    // The issued token works as an end-user credential.
    let me = app.request("GET", "/v1/users/me", None, Some(&user_token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["id"], user.id.as_str());

    let validate = json!({ "token": user_token });
    let denied = app
        .request("POST", "/api/internal/auth/validate", Some(validate.clone()), Some(&without))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let valid = app
        .request("POST", "/api/internal/auth/validate", Some(validate), Some(&with))
        .await;
    assert_eq!(valid.status, StatusCode::OK);
    assert_eq!(valid.body["data"]["sub"], user.id.as_str());

    let invalid = app
        .request(
            "POST",
            "/api/internal/auth/validate",
            Some(json!({ "token": "not.a.jwt" })),
            Some(&with),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_user_token_for_user_of_other_tenant() {
    let (app, token) = setup(&["auth:token"]).await;
    let acme = app.state.tenants.create_tenant("Acme").await.unwrap();
    let other = app.state.tenants.create_tenant("Other").await.unwrap();
    let user = app
        .state
        .users
        .register(
            &acme.id,
            idaas_service::user::RegisterUserRequest {
                email: "ada@example.com".into(),
                password: "secret1".into(),
                profile: None,
            },
        )
        .await
        .unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/internal/auth/token?tenant_id={}", other.id),
            Some(json!({ "user_id": user.id })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
