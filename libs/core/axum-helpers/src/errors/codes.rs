//! Type-safe error codes for API responses.
//!
//! Each code has a string form for clients (e.g. "DUPLICATE_KEY"), an integer
//! for logs and monitoring (e.g. 1008) and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request body or query parameters failed validation
    ValidationError,

    /// Malformed identifier in path or body
    InvalidIdentifier,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// A unique index rejected the value
    DuplicateKey,

    /// A reference points at a record that does not exist
    InvalidReference,

    /// Request is malformed in a way not covered above
    BadRequest,

    /// Route exists but not for this method
    MethodNotAllowed,

    // Server errors
    /// An unexpected internal server error occurred
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Database errors (2000-2999)
    /// Database connection or query error
    DatabaseError,

    /// The collection validator rejected the document
    DocumentValidation,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::InvalidReference => "INVALID_REFERENCE",
            Self::BadRequest => "BAD_REQUEST",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DocumentValidation => "DOCUMENT_VALIDATION",
        }
    }

    /// Integer code for structured logs and metrics.
    ///
    /// - 1000-1999: client and generic server errors
    /// - 2000-2999: database errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidIdentifier => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::DuplicateKey => 1008,
            Self::InvalidReference => 1009,
            Self::ServiceUnavailable => 1011,
            Self::MethodNotAllowed => 1012,
            Self::BadRequest => 1013,

            Self::DatabaseError => 2003,
            Self::DocumentValidation => 2017,
        }
    }

    /// Default user-facing message; variants usually carry a more specific one
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Validation failed",
            Self::InvalidIdentifier => "Invalid identifier",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::DuplicateKey => "Resource already exists",
            Self::InvalidReference => "Referenced resource does not exist",
            Self::BadRequest => "Bad request",
            Self::MethodNotAllowed => "Method not allowed",
            Self::InternalError => "Something went wrong",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseError => "Database error occurred",
            Self::DocumentValidation => "Invalid input data",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
