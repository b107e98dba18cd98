//! Permission administration handlers.

use axum::Json;
use axum::extract::State;

use gatehouse_entity::permission::{Permission, PermissionNode};

use crate::dto::request::{CreatePermissionRequest, UpdatePermissionRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::state::AppState;

/// GET /api/permission/tree
pub async fn tree(State(state): State<AppState>) -> ApiResult<Vec<PermissionNode>> {
    Ok(Json(ApiResponse::ok(state.permission_service.tree().await?)))
}

/// GET /api/permission/all
pub async fn all(State(state): State<AppState>) -> ApiResult<Vec<Permission>> {
    Ok(Json(ApiResponse::ok(state.permission_service.all().await?)))
}

/// GET /api/permission/{id}
pub async fn get(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<Permission> {
    Ok(Json(ApiResponse::ok(state.permission_service.get(id).await?)))
}

/// POST /api/permission
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePermissionRequest>,
) -> ApiResult<Permission> {
    let permission = state
        .permission_service
        .create(auth.context(), req.into())
        .await?;
    Ok(Json(ApiResponse::with_message("Permission created", permission)))
}

/// PUT /api/permission/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdatePermissionRequest>,
) -> ApiResult<Permission> {
    let permission = state
        .permission_service
        .update(auth.context(), id, req.into())
        .await?;
    Ok(Json(ApiResponse::with_message("Permission updated", permission)))
}

/// DELETE /api/permission/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    state.permission_service.delete(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("Permission deleted")))
}
