use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::api::api_router;
use super::response::ApiError;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Identity used for requests that do not name a caller.
    pub default_user: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, default_user: impl Into<String>) -> Self {
        Self {
            store,
            default_user: default_user.into(),
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
