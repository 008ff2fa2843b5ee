use axum::{Json, extract::State};
use chrono::Utc;

use crate::{AppState, error::ApiResult, models::DashboardStats};

/// get_stats
///
/// [Admin Route] Counters for the dashboard landing page.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses((status = 200, description = "Dashboard counters", body = DashboardStats))
)]
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.repo.get_stats(Utc::now()).await?))
}
