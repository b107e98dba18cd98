//! Operation log handlers.

use axum::Json;
use axum::extract::State;
use tracing::info;

use gatehouse_core::types::pagination::PageResponse;
use gatehouse_entity::operation_log::OperationLog;

use crate::dto::request::LogListQuery;
use crate::dto::response::{ApiResponse, RemovedResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, IdPath, PaginationParams};
use crate::state::AppState;

/// GET /api/log/list
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<LogListQuery>,
) -> ApiResult<PageResponse<OperationLog>> {
    let filter = query.into_filter()?;
    let page = state
        .log_service
        .list(&filter, &pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/log/{id}
pub async fn get(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<OperationLog> {
    Ok(Json(ApiResponse::ok(state.log_service.get(id).await?)))
}

/// DELETE /api/log/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    state.log_service.delete(id).await?;
    info!(actor_id = auth.user_id, log_id = id, "Operation log deleted");
    Ok(Json(ApiResponse::message("Operation log deleted")))
}

/// DELETE /api/log/clear
pub async fn clear(State(state): State<AppState>, auth: AuthUser) -> ApiResult<RemovedResponse> {
    let removed = state.log_service.clear().await?;
    info!(actor_id = auth.user_id, removed, "Operation log cleared via API");
    Ok(Json(ApiResponse::with_message(
        "Operation log cleared",
        RemovedResponse { removed },
    )))
}
