use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, cors::CorsConfig, server::ServerConfig,
};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();

        Ok(Self {
            app: app_info!(),
            mongodb: MongoConfig::from_env()?,
            server: ServerConfig::from_env()?,
            cors: CorsConfig::from_env(environment)?,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONGO: [(&str, Option<&str>); 2] = [
        ("MONGODB_URL", Some("mongodb://localhost:27017")),
        ("MONGODB_DATABASE", Some("inventory")),
    ];

    #[test]
    fn test_development_defaults() {
        temp_env::with_vars(
            [
                MONGO[0],
                MONGO[1],
                ("APP_ENV", None),
                ("PORT", None),
                ("CORS_ALLOWED_ORIGIN", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.cors, CorsConfig::Permissive);
                assert_eq!(config.mongodb.database(), "inventory");
                assert_eq!(config.app.name, "inventory_api");
            },
        );
    }

    #[test]
    fn test_missing_database_url_is_named() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None),
                ("MONGODB_DATABASE", Some("inventory")),
            ],
            || {
                let error = Config::from_env().unwrap_err();
                assert!(error.to_string().contains("MONGODB_URL"));
            },
        );
    }

    #[test]
    fn test_production_requires_cors_origins() {
        temp_env::with_vars(
            [
                MONGO[0],
                MONGO[1],
                ("APP_ENV", Some("production")),
                ("CORS_ALLOWED_ORIGIN", None),
            ],
            || {
                let error = Config::from_env().unwrap_err();
                assert!(error.to_string().contains("CORS_ALLOWED_ORIGIN"));
            },
        );
    }
}
