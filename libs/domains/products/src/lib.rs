//! Products Domain
//!
//! This module provides a complete domain implementation for managing products using MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, category checks, population
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Documents, DTOs, query policy
//! └─────────────┘
//! ```
//!
//! Products reference categories. Existence checks and the embedded category
//! come from a [`CategoryResolver`](domain_categories::CategoryResolver),
//! normally the categories service itself.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_categories::{CategoryResolver, CategoryService, MongoCategoryRepository};
//! use domain_products::{handlers, MongoProductRepository, ProductService};
//! use mongodb::Client;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("inventory");
//!
//! let categories = Arc::new(CategoryService::new(MongoCategoryRepository::new(&db)));
//! let resolver: Arc<dyn CategoryResolver> = categories.clone();
//! let service = Arc::new(ProductService::new(MongoProductRepository::new(&db), resolver));
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    CATEGORY_FULL, CATEGORY_SUMMARY, CreateProduct, PRODUCT_QUERY_POLICY, Product, ProductPatch,
    ProductView, Supplier, UpdateProduct,
};
pub use mongodb::MongoProductRepository;
pub use repository::ProductRepository;
pub use service::ProductService;
