//! Dashboard handler.

use axum::Json;
use axum::extract::State;

use gatehouse_service::DashboardStats;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    Ok(Json(ApiResponse::ok(state.dashboard_service.stats().await?)))
}
