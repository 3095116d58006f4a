use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::mongodb::{StoreFailure, classify};
use domain_categories::CategoryError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("No product found with id {0}")]
    NotFound(ObjectId),

    #[error("The value '{value}' already exists for field '{field}'")]
    DuplicateKey { field: String, value: String },

    #[error("Invalid value: {field} = {value}")]
    InvalidIdentifier { field: String, value: String },

    /// Well-formed id that points at no record
    #[error("Invalid value: {field} = {value} does not reference an existing record")]
    InvalidReference { field: String, value: String },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Document failed validation: {0}")]
    DocumentValidation(String),

    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => {
                AppError::NotFound(format!("No product found with id {}", id.to_hex()))
            }
            ProductError::DuplicateKey { field, value } => AppError::DuplicateKey { field, value },
            ProductError::InvalidIdentifier { field, value } => {
                AppError::InvalidIdentifier { field, value }
            }
            ProductError::InvalidReference { field, value } => {
                AppError::InvalidReference { field, value }
            }
            ProductError::Validation(errors) => AppError::from(errors),
            ProductError::DocumentValidation(message) => AppError::DocumentValidation(vec![message]),
            ProductError::Category(err) => err.into(),
            ProductError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        match classify(&err) {
            StoreFailure::DuplicateKey { field, value } => ProductError::DuplicateKey { field, value },
            StoreFailure::DocumentValidation(message) => ProductError::DocumentValidation(message),
            StoreFailure::Other => ProductError::Database(err.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for ProductError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}
