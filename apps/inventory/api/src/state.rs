//! Application state management.
//!
//! Shared state handed to route builders: configuration, the MongoDB
//! handles and the category service, which the products domain also uses
//! to check and embed category references.

use std::sync::Arc;

use domain_categories::{CategoryService, MongoCategoryRepository};
use mongodb::{Client, Database};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    pub db: Database,
    pub categories: Arc<CategoryService<MongoCategoryRepository>>,
}

impl AppState {
    pub fn new(config: crate::config::Config, mongo_client: Client, db: Database) -> Self {
        let categories = Arc::new(CategoryService::new(MongoCategoryRepository::new(&db)));
        Self {
            config,
            mongo_client,
            db,
            categories,
        }
    }
}
