use crate::server::response::ApiError;

const MAX_CABINET_NAME_LEN: usize = 255;
const MAX_FILENAME_LEN: usize = 255;

fn validate_label(value: Option<&str>, entity: &str, max_len: usize) -> Result<String, String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(format!("{entity} is required"));
    }
    if value.chars().count() > max_len {
        return Err(format!("{entity} cannot exceed {max_len} characters"));
    }
    Ok(value.to_string())
}

/// Trims and checks a cabinet name. Missing and blank names are rejected.
pub fn validate_cabinet_name(name: Option<&str>) -> Result<String, ApiError> {
    validate_label(name, "Cabinet name", MAX_CABINET_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_filename(filename: Option<&str>) -> Result<String, ApiError> {
    validate_label(filename, "Filename", MAX_FILENAME_LEN).map_err(ApiError::bad_request)
}

/// Trims free text; blank input becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Maps a partial-update text field: absent stays absent, blank clears the column.
pub fn text_change(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| optional_text(Some(v)))
}

/// Parses an optional enum field. Blank input counts as absent; anything
/// else must be one of the allowed values.
pub fn parse_choice<T>(
    value: Option<&str>,
    parse: fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse(v).map(Some).map_err(ApiError::bad_request),
    }
}
