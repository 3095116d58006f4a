use crate::{ConfigError, Environment};

/// Which browser origins may call the API
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsConfig {
    /// Any origin; only chosen in development when nothing is configured
    Permissive,
    AllowList(Vec<String>),
}

impl CorsConfig {
    /// Reads the comma-separated `CORS_ALLOWED_ORIGIN`.
    ///
    /// Unset or empty falls back to [`CorsConfig::Permissive`] in development
    /// and is an error in production.
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let origins: Vec<String> = std::env::var("CORS_ALLOWED_ORIGIN")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        match (origins.is_empty(), environment) {
            (false, _) => Ok(CorsConfig::AllowList(origins)),
            (true, Environment::Development) => Ok(CorsConfig::Permissive),
            (true, Environment::Production) => Err(ConfigError::MissingEnvVar(
                "CORS_ALLOWED_ORIGIN".to_string(),
            )),
        }
    }
}
