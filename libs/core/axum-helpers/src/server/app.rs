use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::errors::{ErrorEnvelope, error_envelope};
use crate::http::{create_cors_layer, security_headers};
use axum::{Router, middleware};
use core_config::{cors::CorsConfig, server::ServerConfig};
use std::io;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - OpenAPI documentation (Swagger UI, ReDoc, RapiDoc, Scalar)
/// - API routes nested under `/api`
/// - 404 and 405 fallbacks rendered as error envelopes
/// - The error envelope layer in the configured [`ErrorMode`](crate::errors::ErrorMode)
/// - Common middleware (tracing, security headers, CORS, compression)
///
/// Health endpoints (/health, /ready) are merged in by the app.
///
/// # Errors
/// Returns an error if an allow-listed CORS origin is not a valid header value.
///
/// # Example
/// ```ignore
/// let api_routes = Router::new()
///     .nest("/products", products_router)
///     .nest("/categories", categories_router);
///
/// let envelope = ErrorEnvelope::new(ErrorMode::from(environment));
/// let router = create_router::<ApiDoc>(api_routes, envelope, &cors).await?;
/// ```
pub async fn create_router<T>(
    apis: Router,
    envelope: ErrorEnvelope,
    cors: &CorsConfig,
) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors_layer = create_cors_layer(cors)?;
    match cors {
        CorsConfig::Permissive => info!("CORS is permissive (development)"),
        CorsConfig::AllowList(origins) => {
            info!("CORS configured with allowed origins: {}", origins.join(","))
        }
    }
    info!(mode = ?envelope.mode(), "Error envelope configured");

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(envelope, error_envelope))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        // gzip, br, deflate, zstd according to Accept-Encoding
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup`.
///
/// In-flight requests drain before the server future returns. `cleanup`
/// (closing the database client and the like) is bounded by
/// `server_config.shutdown_timeout`; exceeding it is logged and shutdown
/// proceeds.
///
/// # Example
/// ```ignore
/// create_production_app(router, &config.server, async move {
///     drop(client);
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, mut shutdown_rx) = ShutdownCoordinator::new();
    let shutdown_timeout = server_config.shutdown_timeout;

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        let _ = shutdown_rx.recv().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let signal_coordinator = coordinator.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { signal_coordinator.wait_for_signal().await })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // a server error ends serving without a signal; cleanup still has to run
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorMode;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(info(title = "test"))]
    struct TestDoc;

    async fn router(mode: ErrorMode) -> Router {
        let apis = Router::new().route("/things", get(|| async { "things" }));
        create_router::<TestDoc>(apis, ErrorEnvelope::new(mode), &CorsConfig::Permissive)
            .await
            .unwrap()
    }

    async fn send(router: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_api_routes_are_nested() {
        let (status, _) = send(router(ErrorMode::Terse).await, "GET", "/api/things").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_enveloped_404() {
        let (status, body) = send(router(ErrorMode::Terse).await, "GET", "/api/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Can't find /api/nothing on this server");
    }

    #[tokio::test]
    async fn test_verbose_mode_applies_to_fallback() {
        let (_, body) = send(router(ErrorMode::Verbose).await, "GET", "/nowhere").await;
        assert_eq!(body["error"]["kind"], "NotFound");
        assert!(body.get("stack").is_some());
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let response = router(ErrorMode::Terse)
            .await
            .oneshot(
                Request::builder()
                    .uri("/api/things")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }
}
