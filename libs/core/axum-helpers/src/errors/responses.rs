//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "success": false,
        "status": "error",
        "message": "Something went wrong"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "success": false,
        "status": "fail",
        "message": "Validation failed",
        "errors": [
            {"field": "name", "message": "Name must be between 3 and 100 characters", "value": "ab"},
            {"field": "price", "message": "Price must be a non-negative number", "value": -5}
        ]
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid identifier",
    content_type = "application/json",
    example = json!({
        "success": false,
        "status": "fail",
        "message": "Invalid value: _id = not-an-id"
    })
)]
pub struct BadRequestIdentifierResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Duplicate value for a unique field",
    content_type = "application/json",
    example = json!({
        "success": false,
        "status": "fail",
        "message": "The value 'ABC-123' already exists for field 'sku'. Please use another value."
    })
)]
pub struct DuplicateKeyResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "success": false,
        "status": "fail",
        "message": "No product found with id 665f1c2e8b3a4d0012345678"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable",
    content_type = "application/json",
    example = json!({
        "success": false,
        "status": "error",
        "message": "Service is temporarily unavailable"
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);
