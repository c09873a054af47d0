mod cabinets;
mod file_uses;
mod files;
mod session;
mod stats;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;
use crate::server::response::ApiError;

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Cabinets
        .route(
            "/cabinets",
            get(cabinets::get_cabinets)
                .post(cabinets::create_cabinet)
                .put(cabinets::update_cabinet)
                .patch(cabinets::update_cabinet)
                .fallback(method_not_allowed),
        )
        // Files
        .route(
            "/files",
            get(files::get_files)
                .post(files::create_file)
                .put(files::update_file)
                .patch(files::update_file)
                .delete(files::delete_file)
                .fallback(method_not_allowed),
        )
        // File uses (read-only)
        .route(
            "/file_uses",
            get(file_uses::list_file_uses).fallback(method_not_allowed),
        )
        // Dashboard
        .route(
            "/dashboard_stats",
            get(stats::dashboard_stats).fallback(method_not_allowed),
        )
        // Session
        .route(
            "/logout",
            post(session::logout).fallback(method_not_allowed),
        )
}
