//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Syntax and type errors in the body are rejected with the parser's message.
/// A body that parses is validated with the `validator` crate and every
/// violation is reported at once as [`AppError::Validation`].
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateCategory {
///     #[validate(length(min = 2, max = 50))]
///     name: String,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<CreateCategory>) -> String {
///     format!("Creating category: {}", payload.name)
/// }
///
/// let app = Router::new().route("/categories", post(create));
/// ```
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header},
        routing::post,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
        #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
        price: f64,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|ValidatedJson(payload): ValidatedJson<Payload>| async move { payload.name }),
        )
    }

    async fn post_json(body: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_all_violations_are_reported() {
        let (status, body) = post_json(r#"{"name":"ab","price":-1}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "name");
        assert_eq!(errors[1]["field"], "price");
        assert_eq!(errors[1]["value"], -1.0);
    }

    #[tokio::test]
    async fn test_type_error_is_bad_request() {
        let (status, body) = post_json(r#"{"name":"abc","price":"cheap"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let (status, _) = post_json(r#"{"name":"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_payload_passes() {
        let (status, _) = post_json(r#"{"name":"Drill","price":10}"#).await;
        assert_eq!(status, StatusCode::OK);
    }
}
