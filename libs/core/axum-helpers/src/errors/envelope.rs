//! Verbose/terse rendering of failure responses.
//!
//! Handlers never choose how much detail a failure reveals. [`AppError`]
//! renders itself tersely and attaches an [`ErrorReport`] to the response;
//! the [`error_envelope`] middleware re-renders that report when the
//! configured [`ErrorMode`] is verbose.
//!
//! ```rust,ignore
//! let envelope = ErrorEnvelope::new(ErrorMode::from(environment));
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(envelope, error_envelope));
//! ```
//!
//! [`AppError`]: super::AppError

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use core_config::Environment;
use serde_json::Value;

use super::{ErrorCode, ErrorResponse, FieldViolation};

/// How much of a failure is revealed to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Message, structured detail and stack
    Verbose,
    /// Message only; unexpected failures get a generic message
    Terse,
}

impl From<Environment> for ErrorMode {
    fn from(environment: Environment) -> Self {
        if environment.is_production() {
            ErrorMode::Terse
        } else {
            ErrorMode::Verbose
        }
    }
}

/// State for the [`error_envelope`] middleware
#[derive(Debug, Clone, Copy)]
pub struct ErrorEnvelope {
    mode: ErrorMode,
}

impl ErrorEnvelope {
    pub fn new(mode: ErrorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }
}

/// Everything needed to render a failure in either mode
#[derive(Debug, Clone)]
pub struct ErrorReport {
    status: StatusCode,
    message: String,
    operational: bool,
    errors: Option<Vec<FieldViolation>>,
    detail: Value,
    stack: String,
}

impl ErrorReport {
    pub(crate) fn new(
        status: StatusCode,
        message: String,
        operational: bool,
        errors: Option<Vec<FieldViolation>>,
        detail: Value,
        stack: String,
    ) -> Self {
        Self {
            status,
            message,
            operational,
            errors,
            detail,
            stack,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn to_body(&self, mode: ErrorMode) -> ErrorResponse {
        let status = if self.status.is_client_error() {
            "fail"
        } else {
            "error"
        };

        match mode {
            ErrorMode::Verbose => ErrorResponse {
                success: false,
                status: status.to_string(),
                message: self.message.clone(),
                errors: self.errors.clone(),
                error: Some(self.detail.clone()),
                stack: Some(self.stack.clone()),
            },
            ErrorMode::Terse => ErrorResponse {
                success: false,
                status: status.to_string(),
                message: if self.operational {
                    self.message.clone()
                } else {
                    ErrorCode::InternalError.default_message().to_string()
                },
                errors: self.errors.clone(),
                error: None,
                stack: None,
            },
        }
    }

    pub fn render(&self, mode: ErrorMode) -> Response {
        (self.status, Json(self.to_body(mode))).into_response()
    }
}

/// Re-render failures in verbose mode; terse responses pass through untouched
pub async fn error_envelope(
    State(envelope): State<ErrorEnvelope>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if envelope.mode() == ErrorMode::Verbose {
        if let Some(report) = response.extensions_mut().remove::<ErrorReport>() {
            return report.render(ErrorMode::Verbose);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use axum::{Router, body::Body, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(mode: ErrorMode) -> Router {
        Router::new()
            .route(
                "/boom",
                get(|| async { AppError::Internal("pool exhausted".into()) }),
            )
            .route(
                "/missing",
                get(|| async { AppError::NotFound("No product found with id abc".into()) }),
            )
            .route("/ok", get(|| async { "fine" }))
            .layer(axum::middleware::from_fn_with_state(
                ErrorEnvelope::new(mode),
                error_envelope,
            ))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[test]
    fn test_mode_from_environment() {
        assert_eq!(ErrorMode::from(Environment::Production), ErrorMode::Terse);
        assert_eq!(ErrorMode::from(Environment::Development), ErrorMode::Verbose);
    }

    #[tokio::test]
    async fn test_terse_conceals_unexpected_failures() {
        let (status, body) = call(app(ErrorMode::Terse), "/boom").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Something went wrong");
        assert!(body.get("error").is_none());
        assert!(body.get("stack").is_none());
    }

    #[tokio::test]
    async fn test_terse_keeps_operational_message() {
        let (status, body) = call(app(ErrorMode::Terse), "/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "No product found with id abc");
    }

    #[tokio::test]
    async fn test_verbose_reveals_detail_and_stack() {
        let (status, body) = call(app(ErrorMode::Verbose), "/boom").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error: pool exhausted");
        assert_eq!(body["error"]["kind"], "UnexpectedFailure");
        assert_eq!(body["error"]["cause"], "pool exhausted");
        assert!(body["stack"].as_str().unwrap().contains("Internal"));
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let response = app(ErrorMode::Verbose)
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"fine");
    }
}
