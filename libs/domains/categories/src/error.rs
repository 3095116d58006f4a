use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::mongodb::{StoreFailure, classify};
use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("No category found with id {0}")]
    NotFound(ObjectId),

    #[error("The value '{value}' already exists for field '{field}'")]
    DuplicateKey { field: String, value: String },

    #[error("Invalid value: {field} = {value}")]
    InvalidIdentifier { field: String, value: String },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Document failed validation: {0}")]
    DocumentValidation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CategoryResult<T> = Result<T, CategoryError>;

/// Convert CategoryError to AppError for standardized error responses
impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(id) => {
                AppError::NotFound(format!("No category found with id {}", id.to_hex()))
            }
            CategoryError::DuplicateKey { field, value } => AppError::DuplicateKey { field, value },
            CategoryError::InvalidIdentifier { field, value } => {
                AppError::InvalidIdentifier { field, value }
            }
            CategoryError::Validation(errors) => AppError::from(errors),
            CategoryError::DocumentValidation(message) => {
                AppError::DocumentValidation(vec![message])
            }
            CategoryError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CategoryError {
    fn from(err: mongodb::error::Error) -> Self {
        match classify(&err) {
            StoreFailure::DuplicateKey { field, value } => {
                CategoryError::DuplicateKey { field, value }
            }
            StoreFailure::DocumentValidation(message) => CategoryError::DocumentValidation(message),
            StoreFailure::Other => CategoryError::Database(err.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for CategoryError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        CategoryError::Database(err.to_string())
    }
}
