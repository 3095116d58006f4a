use axum_helpers::{ErrorEnvelope, ErrorMode, create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        database = %config.mongodb.database(),
        environment = ?config.environment,
        "Connecting to MongoDB"
    );
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    api::init_indexes(&db).await?;

    let state = AppState::new(config, mongo_client, db);

    let envelope = ErrorEnvelope::new(ErrorMode::from(state.config.environment));
    let router =
        create_router::<openapi::ApiDoc>(api::routes(&state), envelope, &state.config.cors).await?;

    let app = router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()));

    let server = state.config.server.clone();
    let mongo_client = state.mongo_client.clone();
    create_production_app(app, &server, async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Inventory API shutdown complete");
    Ok(())
}
