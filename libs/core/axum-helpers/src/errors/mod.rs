pub mod codes;
pub mod envelope;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;
pub use envelope::{ErrorEnvelope, ErrorMode, ErrorReport, error_envelope};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// One rejected input field.
///
/// Nested fields use dotted paths (`supplier.name`), list elements use
/// brackets (`images[1]`).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
    /// The offending value, when there is one to echo back
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub value: Option<Value>,
}

impl From<query_filter::Violation> for FieldViolation {
    fn from(violation: query_filter::Violation) -> Self {
        Self {
            field: violation.field,
            message: violation.message,
            value: violation.value.map(Value::String),
        }
    }
}

/// `compare_price` to `comparePrice`, matching the JSON field names
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Flatten `validator` errors, nested structs and lists included, sorted by field path.
///
/// Paths use the camelCase JSON names of the fields.
pub fn field_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    fn walk(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldViolation>) {
        for (field, kind) in errors.errors() {
            let field = camel_case(field);
            let path = if prefix.is_empty() {
                field
            } else {
                format!("{prefix}.{field}")
            };
            match kind {
                ValidationErrorsKind::Field(errors) => {
                    out.extend(errors.iter().map(|error| {
                        // custom list validators report the failing element through `index`
                        let field = match error.params.get("index") {
                            Some(index) => format!("{path}[{index}]"),
                            None => path.clone(),
                        };
                        FieldViolation {
                            field,
                            message: error
                                .message
                                .as_ref()
                                .map(|message| message.to_string())
                                .unwrap_or_else(|| error.code.to_string()),
                            value: error.params.get("value").cloned(),
                        }
                    }));
                }
                ValidationErrorsKind::Struct(inner) => walk(&path, inner, out),
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        walk(&format!("{path}[{index}]"), inner, out);
                    }
                }
            }
        }
    }

    let mut out = Vec::new();
    walk("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Failure body.
///
/// `status` is `"fail"` for 4xx and `"error"` for 5xx. `error` and `stack`
/// are only present in verbose mode.
///
/// ```json
/// {
///   "success": false,
///   "status": "fail",
///   "message": "The value 'ABC-1' already exists for field 'sku'. Please use another value."
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
    /// Structured detail: kind, code and variant-specific fields
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub error: Option<Value>,
    /// Error debug form and the span trace it was raised in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Application error type that can be converted to HTTP responses.
///
/// Every variant except [`AppError::Database`] and [`AppError::Internal`] is
/// operational: an anticipated condition whose message is safe to show.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Invalid input data: {}", .0.join(". "))]
    DocumentValidation(Vec<String>),

    #[error("Invalid value: {field} = {value}")]
    InvalidIdentifier { field: String, value: String },

    #[error("Invalid value: {field} = {value} does not reference an existing record")]
    InvalidReference { field: String, value: String },

    #[error("{0}")]
    NotFound(String),

    #[error("The value '{value}' already exists for field '{field}'. Please use another value.")]
    DuplicateKey { field: String, value: String },

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("{0}")]
    BadRequest(String),

    #[error("Method {method} is not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(field_violations(&errors))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DocumentValidation(_)
            | AppError::InvalidIdentifier { .. }
            | AppError::InvalidReference { .. }
            | AppError::DuplicateKey { .. }
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::JsonExtractorRejection(e) => match e.status() {
                StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
                status => status,
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::DocumentValidation(_) => ErrorCode::DocumentValidation,
            AppError::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            AppError::InvalidReference { .. } => ErrorCode::InvalidReference,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::MethodNotAllowed { .. } => ErrorCode::MethodNotAllowed,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn is_operational(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    /// Message shown to the client when the error is operational
    pub fn public_message(&self) -> String {
        match self {
            AppError::JsonExtractorRejection(e) => e.body_text(),
            other => other.to_string(),
        }
    }

    /// Failure category as named in the error taxonomy
    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_)
            | AppError::DocumentValidation(_)
            | AppError::JsonExtractorRejection(_)
            | AppError::BadRequest(_) => "ValidationFailure",
            AppError::InvalidIdentifier { .. } => "CastFailure",
            AppError::InvalidReference { .. } => "InvalidReference",
            AppError::NotFound(_) => "NotFound",
            AppError::DuplicateKey { .. } => "DuplicateKey",
            AppError::MethodNotAllowed { .. } => "MethodNotAllowed",
            AppError::Database(_) | AppError::Internal(_) => "UnexpectedFailure",
        }
    }

    /// Structured detail for verbose responses
    fn detail(&self) -> Value {
        let code = self.code();
        let mut detail = json!({
            "kind": self.kind(),
            "code": code.as_str(),
            "errorCode": code.code(),
            "statusCode": self.status().as_u16(),
        });

        let extra = match self {
            AppError::DocumentValidation(messages) => json!({ "messages": messages }),
            AppError::InvalidIdentifier { field, value }
            | AppError::InvalidReference { field, value } => {
                json!({ "path": field, "value": value })
            }
            AppError::DuplicateKey { field, value } => json!({ "keyValue": { field: value } }),
            AppError::MethodNotAllowed { method, path } => {
                json!({ "method": method, "path": path })
            }
            AppError::Database(cause) | AppError::Internal(cause) => json!({ "cause": cause }),
            _ => Value::Null,
        };

        if let (Value::Object(detail), Value::Object(extra)) = (&mut detail, extra) {
            detail.extend(extra);
        }
        detail
    }

    fn log(&self) {
        let error_code = self.code().code();
        match self {
            AppError::Validation(violations) => {
                tracing::info!(error_code, "Validation error: {:?}", violations);
            }
            AppError::DocumentValidation(messages) => {
                tracing::info!(error_code, "Document validation error: {:?}", messages);
            }
            AppError::InvalidIdentifier { field, value } => {
                tracing::info!(error_code, %field, %value, "Invalid identifier");
            }
            AppError::InvalidReference { field, value } => {
                tracing::info!(error_code, %field, %value, "Dangling reference in input");
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code, "Not found: {}", msg);
            }
            AppError::DuplicateKey { field, value } => {
                tracing::info!(error_code, %field, %value, "Duplicate key");
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code, "JSON extraction error: {:?}", e);
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code, "Bad request: {}", msg);
            }
            AppError::MethodNotAllowed { method, path } => {
                tracing::info!(error_code, %method, %path, "Method not allowed");
            }
            AppError::Database(msg) => {
                tracing::error!(error_code, "Database error: {}", msg);
            }
            AppError::Internal(msg) => {
                tracing::error!(error_code, "Internal server error: {}", msg);
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let report = ErrorReport::new(
            self.status(),
            self.public_message(),
            self.is_operational(),
            match &self {
                AppError::Validation(violations) => Some(violations.clone()),
                _ => None,
            },
            self.detail(),
            format!("{self:?}\n{}", tracing_error::SpanTrace::capture()),
        );

        // Terse until the envelope layer decides otherwise; the report rides
        // along so the layer can re-render without the original error.
        let mut response = report.render(ErrorMode::Terse);
        response.extensions_mut().insert(report);
        response
    }
}
