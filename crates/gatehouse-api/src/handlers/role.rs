//! Role administration handlers.

use axum::Json;
use axum::extract::State;

use gatehouse_core::types::pagination::PageResponse;
use gatehouse_entity::role::Role;
use gatehouse_service::role::RoleWithPermissions;

use crate::dto::request::{CreateRoleRequest, RoleListQuery, UpdateRoleRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, IdPath, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/role/list
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<RoleListQuery>,
) -> ApiResult<PageResponse<RoleWithPermissions>> {
    let filter = query.into_filter()?;
    let page = state
        .role_service
        .list(&filter, &pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/role/all
pub async fn all(State(state): State<AppState>) -> ApiResult<Vec<Role>> {
    Ok(Json(ApiResponse::ok(state.role_service.all().await?)))
}

/// GET /api/role/{id}
pub async fn get(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<RoleWithPermissions> {
    Ok(Json(ApiResponse::ok(state.role_service.get(id).await?)))
}

/// POST /api/role
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> ApiResult<RoleWithPermissions> {
    let role = state
        .role_service
        .create(auth.context(), req.into())
        .await?;
    Ok(Json(ApiResponse::with_message("Role created", role)))
}

/// PUT /api/role/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<RoleWithPermissions> {
    let role = state
        .role_service
        .update(auth.context(), id, req.into())
        .await?;
    Ok(Json(ApiResponse::with_message("Role updated", role)))
}

/// DELETE /api/role/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    state.role_service.delete(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("Role deleted")))
}
