use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub generation_timeout_secs: u64,
    pub port: u16,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGODB_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "prepify".to_string());

        let jwt_secret = settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: JWT_SECRET must be set in production!");
                }
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            });

        let jwt_refresh_secret = settings
            .get_string("auth.jwt_refresh_secret")
            .or_else(|_| env::var("JWT_REFRESH_SECRET"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: JWT_REFRESH_SECRET must be set in production!");
                }
                eprintln!("WARNING: Using default JWT_REFRESH_SECRET (dev mode only!)");
                "dev-refresh-secret-only-for-local-testing".to_string()
            });

        let gemini_api_key = settings
            .get_string("gemini.api_key")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .unwrap_or_else(|_| {
                eprintln!("WARNING: GEMINI_API_KEY not set; question generation will fail");
                String::new()
            });

        let gemini_api_url = settings
            .get_string("gemini.api_url")
            .or_else(|_| env::var("GEMINI_API_URL"))
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let gemini_model = settings
            .get_string("gemini.model")
            .or_else(|_| env::var("GEMINI_MODEL"))
            .unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let generation_timeout_secs = settings
            .get_int("gemini.timeout_seconds")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| {
                env::var("GENERATION_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
            })
            .filter(|v| *v > 0)
            .unwrap_or(30);

        let port = settings
            .get_int("server.port")
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .or_else(|| env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()))
            .unwrap_or(5000);

        Ok(Config {
            mongo_uri,
            mongo_database,
            jwt_secret,
            jwt_refresh_secret,
            gemini_api_key,
            gemini_api_url,
            gemini_model,
            generation_timeout_secs,
            port,
        })
    }
}
