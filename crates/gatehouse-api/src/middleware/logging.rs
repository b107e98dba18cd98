//! Per-request access log.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use gatehouse_service::context::RequestContext;

/// Logs method, path, status, duration and the acting user once the
/// response is ready. Server faults are logged at `warn`, health probes at
/// `debug`.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis() as u64;
    let user_id = response
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.user_id);

    if response.status().is_server_error() {
        warn!(%method, %path, status, duration_ms, ?user_id, "Request failed");
    } else if path == "/api/health" {
        debug!(%method, %path, status, duration_ms, "Health probe");
    } else {
        info!(%method, %path, status, duration_ms, ?user_id, "Request handled");
    }

    response
}
