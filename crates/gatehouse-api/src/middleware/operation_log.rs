//! Operation log capture for every `/api` route.

use axum::body::{Body, to_bytes};
use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use tokio::time::Instant;
use tracing::warn;

use gatehouse_service::context::RequestContext;
use gatehouse_service::operation_log::CapturedExchange;

use crate::dto::response::ApiResponse;
use crate::extractors::client_ip::client_ip;
use crate::state::AppState;

/// Buffers the request and response bodies, runs the request, and hands
/// the resulting entry to the log sink without waiting for storage.
///
/// The acting user comes from the [`RequestContext`] the authorization
/// layer leaves on the response; anonymous requests are logged without one.
pub async fn record_operation(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let received_at = Utc::now();
    let started = Instant::now();

    let operation = matched
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();
    let url = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let ip = client_ip(request.headers(), request.extensions());

    let (parts, body) = request.into_parts();
    let request_body = match to_bytes(body, state.config.server.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, url = %url, "Rejected unreadable request body");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiResponse::failure("Request body too large", None)),
            )
                .into_response();
        }
    };
    let request = Request::from_parts(parts, Body::from(request_body.clone()));

    let response = next.run(request).await;
    let execute_time_ms = started.elapsed().as_millis() as i64;

    let actor = response.extensions().get::<RequestContext>().cloned();
    let status = response.status().as_u16();
    let (parts, body) = response.into_parts();
    let response_body = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, url = %url, "Failed to buffer response body for the operation log");
            Bytes::new()
        }
    };

    let exchange = CapturedExchange {
        user_id: actor.as_ref().map(|c| c.user_id),
        username: actor.map(|c| c.username),
        operation,
        method,
        url,
        ip: Some(ip),
        query: query.as_deref(),
        request_body: &request_body,
        status,
        response_body: &response_body,
        execute_time_ms,
        received_at,
    };
    state
        .log_sink
        .record(exchange.into_entry(state.config.operation_log.max_field_chars));

    Response::from_parts(parts, Body::from(response_body))
}
