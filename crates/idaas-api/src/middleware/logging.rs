//! Request logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info, warn};

/// Path polled by load balancers; logged at debug level only.
const HEALTH_PATH: &str = "/health";

/// One line per request with method, path, status and latency. Server
/// errors log at warn.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), latency_ms, "Request failed");
    } else if path == HEALTH_PATH {
        debug!(%method, %path, status = status.as_u16(), latency_ms, "Health probe");
    } else {
        info!(%method, %path, status = status.as_u16(), latency_ms, "HTTP request");
    }

    response
}
