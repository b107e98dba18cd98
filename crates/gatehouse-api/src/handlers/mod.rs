//! HTTP request handlers.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod log;
pub mod permission;
pub mod role;
pub mod user;

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::dto::response::ApiResponse;

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure("The requested resource does not exist", None)),
    )
}
