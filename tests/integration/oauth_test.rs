//! Integration tests for the client-credentials token endpoint.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

#[tokio::test]
async fn test_client_credentials_issues_scoped_token() {
    let app = helpers::TestApp::new().await;
    app.create_scopes(&["read", "write"]).await;
    app.create_client("svc-a", "s3cret-example", &["read"]).await;

    let response = app.oauth_token("svc-a", "s3cret-example", "client_credentials").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token_type"], "Bearer");
    assert_eq!(response.body["expires_in"], 300);
    assert_eq!(response.body["scope"], "read");

    let token = response.body["access_token"].as_str().unwrap();
    let claims = helpers::jwt_payload(token);
    assert_eq!(claims["sub"], "svc-a");
    assert_eq!(claims["scopes"], json!(["read"]));
    assert_eq!(claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(), 300);
}

#[tokio::test]
async fn test_repeated_exchange_in_same_second_succeeds() {
    let app = helpers::TestApp::new().await;
    app.create_scopes(&["read"]).await;
    app.create_client("svc-a", "s3cret-example", &["read"]).await;

    let first = app.oauth_token("svc-a", "s3cret-example", "client_credentials").await;
    let second = app.oauth_token("svc-a", "s3cret-example", "client_credentials").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);

    for response in [&first, &second] {
        let validation = app
            .request(
                "POST",
                "/v1/internal/services/validate-token",
                Some(json!({ "token": response.body["access_token"] })),
                None,
            )
            .await;
        assert_eq!(validation.status, StatusCode::OK);
        assert_eq!(validation.body["data"]["valid"], true);
    }
}

#[tokio::test]
async fn test_new_grant_shows_in_next_token_only() {
    let app = helpers::TestApp::new().await;
    app.create_scopes(&["read", "write"]).await;
    app.create_client("svc-a", "s3cret-example", &["read"]).await;

    let first = app.service_token("svc-a", "s3cret-example").await;
    app.grant("svc-a", "write").await;
    let second = app.service_token("svc-a", "s3cret-example").await;

    assert_eq!(helpers::jwt_payload(&first)["scopes"], json!(["read"]));
    assert_eq!(helpers::jwt_payload(&second)["scopes"], json!(["read", "write"]));

    // The earlier token keeps its snapshot and stays valid.
    let validation = app
        .request(
            "POST",
            "/v1/internal/services/validate-token",
            Some(json!({ "token": first })),
            None,
        )
        .await;
    assert_eq!(validation.status, StatusCode::OK);
    assert_eq!(validation.body["data"]["valid"], true);
    assert_eq!(validation.body["data"]["scopes"], json!(["read"]));
}

#[tokio::test]
async fn test_wrong_grant_type_is_bad_request() {
    let app = helpers::TestApp::new().await;
    app.create_client("svc-a", "s3cret-example", &[]).await;

    let response = app.oauth_token("svc-a", "s3cret-example", "password").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "grant_type must be client_credentials");
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let app = helpers::TestApp::new().await;
    app.create_client("svc-a", "s3cret-example", &[]).await;

    let wrong_secret = app.oauth_token("svc-a", "not-the-secret", "client_credentials").await;
    let unknown = app.oauth_token("svc-b", "s3cret-example", "client_credentials").await;

    assert_eq!(wrong_secret.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    // Unknown client and wrong secret are indistinguishable.
    assert_eq!(wrong_secret.body, unknown.body);
    assert!(!wrong_secret.body.to_string().contains("s3cret"));
}

#[tokio::test]
async fn test_credentials_checked_before_grant_type() {
    let app = helpers::TestApp::new().await;
    app.create_client("svc-a", "s3cret-example", &[]).await;

    let response = app.oauth_token("svc-a", "not-the-secret", "password").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_basic_auth() {
    let app = helpers::TestApp::new().await;

    let req = Request::builder()
        .method("POST")
        .uri("/oauth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("grant_type=client_credentials"))
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Basic authorization required");
}

#[tokio::test]
async fn test_inactive_client_cannot_get_token() {
    use idaas_database::store::ClientStore;

    let app = helpers::TestApp::new().await;
    app.create_client("svc-a", "s3cret-example", &[]).await;
    app.store.set_client_active("svc-a", false).await.unwrap();

    let response = app.oauth_token("svc-a", "s3cret-example", "client_credentials").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
