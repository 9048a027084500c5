//! Application builder: wires router, middleware and state into an Axum app.

use axum::Router;
use axum::middleware as axum_middleware;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// client addresses reach the access log.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(&state)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_logging))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use tower::ServiceExt;

    use idaas_auth::jwt::Signer;
    use idaas_auth::password::PasswordHasher;
    use idaas_core::config::AppConfig;
    use idaas_database::{MemoryStore, Stores};

    fn app() -> Router {
        let signer = || Signer::hs256("0123456789abcdef0123456789abcdef").unwrap();
        let (state, _worker) = AppState::build(
            AppConfig::default(),
            Stores::memory(Arc::new(MemoryStore::new())),
            signer(),
            signer(),
            PasswordHasher::with_cost(1024, 1).unwrap(),
        )
        .unwrap();
        build_app(state)
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/oauth/token")
            .header(header::ORIGIN, "https://admin.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
