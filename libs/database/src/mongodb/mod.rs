//! MongoDB connector and utilities
//!
//! Connection management, readiness probing and write-failure classification.

mod config;
mod connector;
mod errors;
mod health;

pub use config::MongoConfig;
pub use connector::{connect_from_config, connect_from_config_with_retry};
pub use errors::{DOCUMENT_VALIDATION_CODE, DUPLICATE_KEY_CODE, StoreFailure, classify};
pub use health::{HealthStatus, check_health_detailed};

pub use mongodb::{Client, Collection, Database};
