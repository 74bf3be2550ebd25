use crate::config::Config;
use mongodb::{Client as MongoClient, Database};

pub struct AppState {
    pub config: Config,
    pub mongo: Database,
}

impl AppState {
    /// The MongoDB driver connects lazily, so building state performs no
    /// I/O; the first query (or the health check) surfaces a bad URI.
    pub fn new(config: Config, mongo_client: MongoClient) -> Self {
        let mongo = mongo_client.database(&config.mongo_database);
        Self { config, mongo }
    }
}

pub mod analysis;
pub mod auth_service;
pub mod interview;
pub mod question_source;
pub mod response_store;
