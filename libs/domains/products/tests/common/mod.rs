//! In-memory repositories and request helpers for handler tests

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
    Category, CategoryError, CategoryPatch, CategoryRepository, CategoryResolver, CategoryResult,
    CategoryService,
};
use domain_products::{
    Product, ProductError, ProductPatch, ProductRepository, ProductResult, ProductService,
};
use http_body_util::BodyExt;
use mongodb::bson::{self, oid::ObjectId};
use query_filter::{Filter, QuerySpec};
use serde_json::{Value, json};
use test_utils::{MemoryCollection, MemoryError};
use tower::ServiceExt;

pub struct InMemoryProductRepository {
    collection: MemoryCollection,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            collection: MemoryCollection::new()
                .unique("sku")
                .text_index(&["name", "description", "supplier.name"]),
        }
    }
}

fn product_store_error(error: MemoryError) -> ProductError {
    match error {
        MemoryError::DuplicateKey { field, value } => ProductError::DuplicateKey { field, value },
        MemoryError::Serialization(message) => ProductError::Database(message),
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: Product) -> ProductResult<Product> {
        self.collection.insert(&product).map_err(product_store_error)?;
        Ok(product)
    }

    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        Ok(self.collection.find_by_id(id))
    }

    async fn find(&self, query: &QuerySpec) -> ProductResult<Vec<Product>> {
        Ok(self.collection.find(query))
    }

    async fn count(&self, filter: &Filter) -> ProductResult<u64> {
        Ok(self.collection.count(filter))
    }

    async fn update(&self, id: ObjectId, patch: ProductPatch) -> ProductResult<Option<Product>> {
        let Some(mut product) = self.collection.find_by_id::<Product>(id) else {
            return Ok(None);
        };
        patch.apply(&mut product, bson::DateTime::now());
        self.collection.replace(&product).map_err(product_store_error)?;
        Ok(Some(product))
    }

    async fn delete(&self, id: ObjectId) -> ProductResult<bool> {
        Ok(self.collection.delete(id))
    }

    async fn exists_by_sku(&self, sku: &str, exclude: Option<ObjectId>) -> ProductResult<bool> {
        Ok(self.collection.exists_where("sku", sku, exclude))
    }
}

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

fn category_store_error(error: MemoryError) -> CategoryError {
    match error {
        MemoryError::DuplicateKey { field, value } => CategoryError::DuplicateKey { field, value },
        MemoryError::Serialization(message) => CategoryError::Database(message),
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn insert(&self, category: Category) -> CategoryResult<Category> {
        self.collection.insert(&category).map_err(category_store_error)?;
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
        self.collection.replace(&category).map_err(category_store_error)?;
        Ok(Some(category))
    }

    async fn delete(&self, id: ObjectId) -> CategoryResult<bool> {
        Ok(self.collection.delete(id))
    }

    async fn exists_by_name(&self, name: &str, exclude: Option<ObjectId>) -> CategoryResult<bool> {
        Ok(self.collection.exists_where("name", name, exclude))
    }
}

/// Products and categories mounted the way the API mounts them
pub fn app() -> Router {
    let categories = Arc::new(CategoryService::new(InMemoryCategoryRepository::new()));
    let resolver: Arc<dyn CategoryResolver> = categories.clone();
    let products = Arc::new(ProductService::new(
        InMemoryProductRepository::new(),
        resolver,
    ));

    Router::new()
        .nest("/api/categories", domain_categories::handlers::router(categories))
        .nest("/api/products", domain_products::handlers::router(products))
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

/// POST `body` to `uri` and return the new record's id
pub async fn create(app: &Router, uri: &str, body: Value) -> String {
    let (status, response) = send(app, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {response}");
    response["data"]["_id"].as_str().unwrap().to_string()
}

/// A product body that passes validation
pub fn product_body(name: &str, sku: &str, price: f64, category: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{name} for the workshop"),
        "price": price,
        "sku": sku,
        "category": category,
    })
}
