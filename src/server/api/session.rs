use axum::{Json, response::IntoResponse};

use crate::auth::Caller;
use crate::server::response::ApiResponse;

/// There is no server-side session to destroy, so logout always succeeds.
pub async fn logout(caller: Caller) -> impl IntoResponse {
    tracing::info!(user = %caller.name(), "logout");
    Json(ApiResponse::message_only("Logged out successfully"))
}
