//! `?logical=` flag for delete endpoints.

use crate::errors::{AppError, FieldViolation};
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use query_filter::RawParams;
use serde_json::Value;

/// Whether a delete removes the record or only flips its active flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Mark inactive/unavailable and keep the record
    Logical,
    /// Remove the record
    #[default]
    Physical,
}

impl DeleteMode {
    /// Parse the raw `logical` parameter; absent means physical
    pub fn from_param(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") | Some("false") => Ok(DeleteMode::Physical),
            Some("true") => Ok(DeleteMode::Logical),
            Some(other) => Err(AppError::Validation(vec![FieldViolation {
                field: "logical".to_string(),
                message: "must be 'true' or 'false'".to_string(),
                value: Some(Value::String(other.to_string())),
            }])),
        }
    }
}

impl<S> FromRequestParts<S> for DeleteMode
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<RawParams>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        DeleteMode::from_param(params.get("logical").map(String::as_str))
    }
}
