//! # Axum Helpers
//!
//! Shared HTTP plumbing for the inventory services.
//!
//! ## Modules
//!
//! - **[`server`]**: Router assembly, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers)
//! - **[`errors`]**: Failure taxonomy, error codes and the verbose/terse envelope
//! - **[`extractors`]**: Validation gate (ObjectId path, validated JSON, list queries, delete mode)
//! - **[`response`]**: Success envelopes
//! - **[`serde_helpers`]**: Request body deserializers
//! - **[`validators`]**: Custom field validators (ObjectId, URL lists)
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::{ErrorEnvelope, ErrorMode, create_production_app, create_router};
//! use core_config::{Environment, cors::CorsConfig, server::ServerConfig};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let environment = Environment::from_env();
//!     let api_routes = Router::new(); // Add your routes
//!     let envelope = ErrorEnvelope::new(ErrorMode::from(environment));
//!     let cors = CorsConfig::from_env(environment)?;
//!     let router = create_router::<ApiDoc>(api_routes, envelope, &cors).await?;
//!
//!     create_production_app(router, &ServerConfig::default(), async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod response;
pub mod serde_helpers;
pub mod server;
pub mod validators;

// Re-export server types
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

// Re-export HTTP middleware
pub use http::{create_cors_layer, security_headers};

// Re-export error types
pub use errors::{
    AppError, ErrorCode, ErrorEnvelope, ErrorMode, ErrorResponse, FieldViolation, field_violations,
};

// Re-export extractors
pub use extractors::{DeleteMode, FilterQuery, ObjectIdPath, ValidatedJson};

pub use response::{ApiResponse, DeleteResponse, ListResponse};
