use std::convert::Infallible;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::server::AppState;

/// Header set by an authenticating reverse proxy to name the caller.
pub const CALLER_HEADER: &str = "x-forwarded-user";

/// The identity a request acts as, recorded as `added_by` on created rows.
///
/// There are no sessions. The identity comes from [`CALLER_HEADER`] when
/// present and non-blank, otherwise from the configured default user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| state.default_user.clone(), str::to_string);

        Ok(Caller(name))
    }
}
