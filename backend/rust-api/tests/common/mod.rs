use axum::Router;
use std::sync::Arc;

use prepify_api::{config::Config, create_router, services::AppState};

/// Router wired against an unconnected MongoDB client. The driver connects
/// lazily, so every request path that fails before issuing a query can be
/// exercised without a live database.
pub async fn create_test_app() -> (Router, Config) {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let config = Config::load().expect("Failed to load test configuration");

    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("Failed to create MongoDB client");

    let app_state = Arc::new(AppState::new(config.clone(), mongo_client));

    (create_router(app_state), config)
}
