//! Categories Domain
//!
//! Category CRUD on MongoDB, plus the [`CategoryResolver`] other domains use
//! to check and embed category references.
//!
//! # Architecture
//!
//! ```text
//! Handlers (HTTP) → Service (Business Logic) → Repository (Data Access) → MongoDB
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_categories::{CategoryService, MongoCategoryRepository, handlers};
//! use std::sync::Arc;
//!
//! let repository = MongoCategoryRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = Arc::new(CategoryService::new(repository));
//!
//! let app = Router::new().nest("/categories", handlers::router(service.clone()));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{CategoryError, CategoryResult};
pub use handlers::ApiDoc;
pub use models::{
    CATEGORY_QUERY_POLICY, Category, CategoryPatch, CategorySummary, CategoryView,
    CreateCategory, PARENT_FULL, PARENT_SUMMARY, UpdateCategory, to_chrono,
};
pub use mongodb::MongoCategoryRepository;
pub use repository::CategoryRepository;
pub use service::{CategoryResolver, CategoryService};
