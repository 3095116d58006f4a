//! API routes module
//!
//! This module defines all HTTP API routes for the inventory API.

pub mod categories;
pub mod health;
pub mod products;

use axum::Router;
use mongodb::Database;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", products::router(state))
        .nest("/categories", categories::router(state))
}

/// Create the indexes both collections rely on
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    categories::init_indexes(db).await?;
    products::init_indexes(db).await?;
    Ok(())
}
