//! Auth handlers: register, login, logout, current user.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use gatehouse_service::auth::{CurrentUser, LoginResult, RegisteredUser};

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthUser, ClientIp, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredUser>>), ApiError> {
    let user = state.auth_service.register(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Registration successful", user)),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResult> {
    let result = state.auth_service.login(req.into(), &ip).await?;
    Ok(Json(ApiResponse::with_message("Login successful", result)))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<()> {
    state.auth_service.logout(auth.context()).await?;
    Ok(Json(ApiResponse::message("Logged out successfully")))
}

/// GET /api/auth/current
pub async fn current(State(state): State<AppState>, auth: AuthUser) -> ApiResult<CurrentUser> {
    let current = state.auth_service.current_user(auth.context()).await?;
    Ok(Json(ApiResponse::ok(current)))
}
