use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::FileUseParams;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub async fn list_file_uses(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FileUseParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = params?;
    let cabinet_id = params
        .cabinet_id
        .ok_or_else(|| ApiError::bad_request("cabinet_id is required"))?;

    let uses = state
        .store
        .list_cabinet_file_uses(cabinet_id)
        .api_err("Failed to list file uses")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(uses, "File uses retrieved successfully")))
}
