//! User administration handlers.

use axum::Json;
use axum::extract::State;

use gatehouse_core::types::pagination::PageResponse;
use gatehouse_entity::user::User;
use gatehouse_service::user::UserWithRoles;

use crate::dto::request::{
    CreateUserRequest, ResetPasswordRequest, UpdateStatusRequest, UpdateUserRequest,
    UserListQuery,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, IdPath, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/user/list
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> ApiResult<PageResponse<UserWithRoles>> {
    let filter = query.into_filter()?;
    let page = state
        .user_service
        .list(&filter, &pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/user/{id}
pub async fn get(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<UserWithRoles> {
    let user = state.user_service.get(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/user
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<UserWithRoles> {
    let user = state
        .user_service
        .create(auth.context(), req.into())
        .await?;
    Ok(Json(ApiResponse::with_message("User created", user)))
}

/// PUT /api/user/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserWithRoles> {
    let user = state
        .user_service
        .update(auth.context(), id, req.into())
        .await?;
    Ok(Json(ApiResponse::with_message("User updated", user)))
}

/// DELETE /api/user/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    state.user_service.delete(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("User deleted")))
}

/// PATCH /api/user/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<User> {
    let user = state
        .user_service
        .change_status(auth.context(), id, req.status)
        .await?;
    Ok(Json(ApiResponse::with_message("User status updated", user)))
}

/// POST /api/user/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<()> {
    state
        .user_service
        .reset_password(auth.context(), id, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::message("Password reset")))
}
