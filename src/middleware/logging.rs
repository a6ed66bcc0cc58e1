//! Request logging middleware

use std::time::Instant;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};

use super::AuthenticatedUser;

/// Log one line per request with the caller, status and latency.
///
/// Runs inside the auth layer so the caller id is known. Polling the result
/// endpoint answers 202/404 routinely, so those are logged at info.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user_id = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|u| u.id);

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        warn!(%method, %path, ?user_id, status, duration_ms, "Request failed");
    } else {
        info!(%method, %path, ?user_id, status, duration_ms, "Request completed");
    }

    response
}
