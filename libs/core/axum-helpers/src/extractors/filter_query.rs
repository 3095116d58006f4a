//! Query-string extractor that runs the query compiler.

use std::marker::PhantomData;

use crate::errors::{AppError, FieldViolation};
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use query_filter::{Filterable, QuerySpec, RawParams, compile};

/// Checked and compiled list query for entity `E`.
///
/// Every parameter the entity's policy names is checked; all violations are
/// reported together as [`AppError::Validation`]. Unknown parameters are
/// ignored.
///
/// # Example
/// ```ignore
/// async fn list(FilterQuery(query, ..): FilterQuery<Product>) -> Json<Value> {
///     let products = repository.find(&query).await?;
///     // ...
/// }
/// ```
#[derive(Debug)]
pub struct FilterQuery<E>(pub QuerySpec, pub PhantomData<fn() -> E>);

impl<E> FilterQuery<E> {
    pub fn into_inner(self) -> QuerySpec {
        self.0
    }
}

impl<E, S> FromRequestParts<S> for FilterQuery<E>
where
    E: Filterable,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<RawParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let checked = E::query_policy().check(&params).map_err(|violations| {
            AppError::Validation(violations.into_iter().map(FieldViolation::from).collect())
        })?;

        Ok(FilterQuery(compile(&checked), PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use query_filter::{FieldRule, MatchMode, NumberKind, QueryPolicy, SortOrder};
    use serde_json::Value;
    use tower::ServiceExt;

    struct Widget;

    static WIDGET_POLICY: QueryPolicy = QueryPolicy {
        fields: &[
            FieldRule::new("name", "name", MatchMode::Contains),
            FieldRule::new("weight", "weight", MatchMode::Range(NumberKind::Decimal)),
            FieldRule::new("inStock", "inStock", MatchMode::Flag),
        ],
        sortable: &["name", "weight"],
        default_sort: "name",
        default_order: SortOrder::Asc,
        populate: None,
    };

    impl Filterable for Widget {
        fn query_policy() -> &'static QueryPolicy {
            &WIDGET_POLICY
        }
    }

    fn app() -> Router {
        Router::new().route(
            "/widgets",
            get(|query: FilterQuery<Widget>| async move {
                let spec = query.into_inner();
                format!("{}:{}:{}", spec.sort.field, spec.skip(), spec.limit())
            }),
        )
    }

    async fn get_uri(uri: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_compiles_valid_query() {
        let (status, body) = get_uri("/widgets?sortBy=weight&page=3&limit=5&bogus=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "weight:10:5");
    }

    #[tokio::test]
    async fn test_collects_every_violation() {
        let (status, body) = get_uri("/widgets?weightMin=heavy&inStock=yes&sortBy=colour").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_str(&body).unwrap();
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|error| error["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(&"weightMin"));
        assert!(fields.contains(&"inStock"));
        assert!(fields.contains(&"sortBy"));
    }
}
