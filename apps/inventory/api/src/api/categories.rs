//! Categories API routes

use axum::Router;
use domain_categories::{MongoCategoryRepository, handlers};
use mongodb::Database;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(state.categories.clone())
}

/// Unique name and parent indexes
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoCategoryRepository::new(db).init_indexes().await?;
    Ok(())
}
