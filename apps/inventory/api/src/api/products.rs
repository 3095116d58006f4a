//! Products API routes
//!
//! Wires the products domain to MongoDB and to the category service for
//! reference checks and population.

use std::sync::Arc;

use axum::Router;
use domain_categories::CategoryResolver;
use domain_products::{MongoProductRepository, ProductService, handlers};
use mongodb::Database;

use crate::state::AppState;

/// Create products router
pub fn router(state: &AppState) -> Router {
    let repository = MongoProductRepository::new(&state.db);
    let categories: Arc<dyn CategoryResolver> = state.categories.clone();

    let service = ProductService::new(repository, categories);
    handlers::router(Arc::new(service))
}

/// Unique SKU, text search and lookup indexes
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoProductRepository::new(db).init_indexes().await?;
    Ok(())
}
