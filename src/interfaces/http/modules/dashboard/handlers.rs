//! Dashboard handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::{DashboardService, DashboardStats};
use crate::interfaces::http::common::ApiResponse;
use crate::shared::AppResult;

#[derive(Clone)]
pub struct DashboardHandlerState {
    pub service: Arc<DashboardService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Roster and club counts, cached for a minute", body = ApiResponse<DashboardStats>)
    )
)]
pub async fn dashboard_stats(
    State(state): State<DashboardHandlerState>,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    Ok(Json(ApiResponse::success(state.service.stats().await?)))
}
