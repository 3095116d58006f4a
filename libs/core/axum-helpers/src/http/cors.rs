use std::io;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use core_config::cors::CorsConfig;
use tower_http::cors::CorsLayer;

/// Creates a CORS layer from configuration.
///
/// An allow-list gets the API's methods and headers with a 1 hour max age.
/// [`CorsConfig::Permissive`] allows any origin and is only produced in
/// development.
pub fn create_cors_layer(config: &CorsConfig) -> io::Result<CorsLayer> {
    let origins = match config {
        CorsConfig::Permissive => return Ok(CorsLayer::permissive()),
        CorsConfig::AllowList(origins) => origins,
    };

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid CORS origin '{origin}': {e}"),
                )
            })
        })
        .collect::<io::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600)))
}
