use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub async fn dashboard_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state
        .store
        .dashboard_stats()
        .api_err("Failed to load dashboard stats")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        stats,
        "Dashboard stats retrieved successfully",
    )))
}
