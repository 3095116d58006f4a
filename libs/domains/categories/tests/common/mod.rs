//! In-memory category repository and request helpers for handler tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use axum_helpers::{ErrorEnvelope, ErrorMode, errors::error_envelope};
use domain_categories::{
    Category, CategoryError, CategoryPatch, CategoryRepository, CategoryResult, CategoryService,
    handlers,
};
use http_body_util::BodyExt;
use mongodb::bson::{self, oid::ObjectId};
use query_filter::{Filter, QuerySpec};
use serde_json::Value;
use test_utils::{MemoryCollection, MemoryError};
use tower::ServiceExt;

pub struct InMemoryCategoryRepository {
    collection: MemoryCollection,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            collection: MemoryCollection::new().unique("name"),
        }
    }
}

fn store_error(error: MemoryError) -> CategoryError {
    match error {
        MemoryError::DuplicateKey { field, value } => CategoryError::DuplicateKey { field, value },
        MemoryError::Serialization(message) => CategoryError::Database(message),
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn insert(&self, category: Category) -> CategoryResult<Category> {
        self.collection.insert(&category).map_err(store_error)?;
        Ok(category)
    }

    async fn find_by_id(&self, id: ObjectId) -> CategoryResult<Option<Category>> {
        Ok(self.collection.find_by_id(id))
    }

    async fn find_by_ids(&self, ids: Vec<ObjectId>) -> CategoryResult<Vec<Category>> {
        Ok(self.collection.find_by_ids(&ids))
    }

    async fn find(&self, query: &QuerySpec) -> CategoryResult<Vec<Category>> {
        Ok(self.collection.find(query))
    }

    async fn count(&self, filter: &Filter) -> CategoryResult<u64> {
        Ok(self.collection.count(filter))
    }

    async fn update(&self, id: ObjectId, patch: CategoryPatch) -> CategoryResult<Option<Category>> {
        let Some(mut category) = self.collection.find_by_id::<Category>(id) else {
            return Ok(None);
        };
        patch.apply(&mut category, bson::DateTime::now());
        self.collection.replace(&category).map_err(store_error)?;
        Ok(Some(category))
    }

    async fn delete(&self, id: ObjectId) -> CategoryResult<bool> {
        Ok(self.collection.delete(id))
    }

    async fn exists_by_name(&self, name: &str, exclude: Option<ObjectId>) -> CategoryResult<bool> {
        Ok(self.collection.exists_where("name", name, exclude))
    }
}

/// Categories router mounted the way the API mounts it
pub fn app() -> Router {
    let service = Arc::new(CategoryService::new(InMemoryCategoryRepository::new()));
    Router::new()
        .nest("/api/categories", handlers::router(service))
        .layer(axum::middleware::from_fn_with_state(
            ErrorEnvelope::new(ErrorMode::Terse),
            error_envelope,
        ))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Create a category and return its id
pub async fn create(app: &Router, body: Value) -> String {
    let (status, response) = send(app, "POST", "/api/categories", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {response}");
    response["data"]["_id"].as_str().unwrap().to_string()
}
