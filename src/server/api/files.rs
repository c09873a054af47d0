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
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{CreateFileRequest, FileParams, UpdateFileRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{optional_text, parse_choice, text_change, validate_filename};
use crate::types::{Category, FileChanges, FileFilter, FileStatus, NewFile};

/// Returns a single file when `id` is given, otherwise the live files of `cabinet_id`.
pub async fn get_files(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FileParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let store = state.store.as_ref();

    if let Some(id) = params.id {
        let file = store
            .get_file(id)
            .api_err("Failed to get file")?
            .or_not_found("File not found")?;

        let body = ApiResponse::success(file, "File retrieved successfully");
        return Ok(Json(body).into_response());
    }

    let cabinet_id = params
        .cabinet_id
        .ok_or_else(|| ApiError::bad_request("cabinet_id is required"))?;

    let filter = FileFilter {
        search: optional_text(params.search),
        status: parse_choice(params.status.as_deref(), FileStatus::parse_field)?,
    };

    let files = store
        .list_cabinet_files(cabinet_id, &filter)
        .api_err("Failed to list files")?;

    Ok(Json(ApiResponse::success(files, "Files retrieved successfully")).into_response())
}

pub async fn create_file(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateFileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let store = state.store.as_ref();

    let cabinet_id = req
        .cabinet_id
        .ok_or_else(|| ApiError::bad_request("cabinet_id is required"))?;
    let filename = validate_filename(req.filename.as_deref())?;
    let category =
        parse_choice(req.category.as_deref(), Category::parse_field)?.unwrap_or_default();
    let status =
        parse_choice(req.status.as_deref(), FileStatus::parse_field)?.unwrap_or_default();

    let new_file = NewFile {
        cabinet_id,
        filename,
        description: optional_text(req.description),
        category,
        status,
        added_by: caller.0,
    };

    let file = match store.create_file(&new_file) {
        Ok(file) => file,
        Err(Error::NotFound) => return Err(ApiError::bad_request("Invalid cabinet_id")),
        Err(Error::Conflict(message)) => {
            tracing::warn!("File allocation conflict: {message}");
            return Err(ApiError::conflict("Cabinet number already allocated, please retry"));
        }
        Err(e) => {
            tracing::error!("Failed to create file: {e}");
            return Err(ApiError::internal("Failed to create file"));
        }
    };

    tracing::info!(
        file_id = file.id,
        cabinet_number = %file.cabinet_number,
        added_by = %file.added_by,
        "file created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(file, "File created successfully")),
    )
        .into_response())
}

pub async fn update_file(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FileParams>, QueryRejection>,
    payload: Result<Json<UpdateFileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let id = params
        .id
        .ok_or_else(|| ApiError::bad_request("File id is required"))?;
    let Json(req) = payload?;
    let store = state.store.as_ref();

    let changes = FileChanges {
        filename: req
            .filename
            .as_deref()
            .map(|filename| validate_filename(Some(filename)))
            .transpose()?,
        description: text_change(req.description),
        category: parse_choice(req.category.as_deref(), Category::parse_field)?,
        status: parse_choice(req.status.as_deref(), FileStatus::parse_field)?,
    };

    if changes.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let updated = store
        .update_file(id, &changes)
        .api_err("Failed to update file")?;
    if !updated {
        return Err(ApiError::not_found("File not found"));
    }

    // A missing row here means the write landed and the file was deleted since.
    let file = store.get_file(id).api_err("Failed to get file")?;

    Ok(Json(ApiResponse::new(file, "File updated successfully")).into_response())
}

/// Soft-deletes a file. Repeating the call on the same id reports not found.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FileParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let id = params
        .id
        .ok_or_else(|| ApiError::bad_request("File id is required"))?;

    let deleted = state
        .store
        .delete_file(id)
        .api_err("Failed to delete file")?;
    if !deleted {
        return Err(ApiError::not_found("File not found"));
    }

    tracing::info!(file_id = id, "file archived");

    Ok(Json(ApiResponse::message_only("File archived successfully")).into_response())
}
