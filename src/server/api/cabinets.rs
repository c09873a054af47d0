use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::Caller;
use crate::server::AppState;
use crate::server::dto::{CabinetParams, CreateCabinetRequest, UpdateCabinetRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{
    optional_text, parse_choice, text_change, validate_cabinet_name,
};
use crate::types::{CabinetChanges, CabinetStatus, NewCabinet};

/// Lists live cabinets, or returns a single cabinet when `id` is given.
pub async fn get_cabinets(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CabinetParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let store = state.store.as_ref();

    if let Some(id) = params.id {
        let cabinet = store
            .get_cabinet(id)
            .api_err("Failed to get cabinet")?
            .or_not_found("Cabinet not found")?;

        let body = ApiResponse::success(cabinet, "Cabinet retrieved successfully");
        return Ok(Json(body).into_response());
    }

    let cabinets = store
        .list_cabinets(params.include_archived.unwrap_or(false))
        .api_err("Failed to list cabinets")?;

    Ok(Json(ApiResponse::success(cabinets, "Cabinets retrieved successfully")).into_response())
}

pub async fn create_cabinet(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCabinetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let store = state.store.as_ref();

    let name = validate_cabinet_name(req.name.as_deref())?;
    let status =
        parse_choice(req.status.as_deref(), CabinetStatus::parse_field)?.unwrap_or_default();

    let new_cabinet = NewCabinet {
        name,
        description: optional_text(req.description),
        position: req.position,
        status,
        added_by: caller.0,
    };

    let id = store
        .create_cabinet(&new_cabinet)
        .api_err("Failed to create cabinet")?;

    tracing::info!(cabinet_id = id, added_by = %new_cabinet.added_by, "cabinet created");

    let cabinet = store.get_cabinet(id).api_err("Failed to get cabinet")?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(cabinet, "Cabinet created successfully")),
    )
        .into_response())
}

pub async fn update_cabinet(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CabinetParams>, QueryRejection>,
    payload: Result<Json<UpdateCabinetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let id = params
        .id
        .ok_or_else(|| ApiError::bad_request("Cabinet id is required"))?;
    let Json(req) = payload?;
    let store = state.store.as_ref();

    let changes = CabinetChanges {
        name: req
            .name
            .as_deref()
            .map(|name| validate_cabinet_name(Some(name)))
            .transpose()?,
        description: text_change(req.description),
        position: req.position,
        status: parse_choice(req.status.as_deref(), CabinetStatus::parse_field)?,
    };

    if changes.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let updated = store
        .update_cabinet(id, &changes)
        .api_err("Failed to update cabinet")?;
    if !updated {
        return Err(ApiError::not_found("Cabinet not found"));
    }

    // A missing row here means the write landed and something else removed it since.
    let cabinet = store.get_cabinet(id).api_err("Failed to get cabinet")?;

    Ok(Json(ApiResponse::new(cabinet, "Cabinet updated successfully")).into_response())
}
