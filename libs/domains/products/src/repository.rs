use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use query_filter::{Filter, QuerySpec};

use crate::error::ProductResult;
use crate::models::{Product, ProductPatch};

/// Repository trait for Product persistence
///
/// A unique SKU violation surfaces as [`ProductError::DuplicateKey`](crate::ProductError::DuplicateKey).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: Product) -> ProductResult<Product>;

    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>>;

    /// One page of products matching the compiled query
    async fn find(&self, query: &QuerySpec) -> ProductResult<Vec<Product>>;

    /// Matching products across all pages
    async fn count(&self, filter: &Filter) -> ProductResult<u64>;

    /// Apply `patch`; `None` when no product has `id`
    async fn update(&self, id: ObjectId, patch: ProductPatch) -> ProductResult<Option<Product>>;

    /// Remove the product; `false` when no product has `id`
    async fn delete(&self, id: ObjectId) -> ProductResult<bool>;

    /// Whether another product (not `exclude`) already uses the upper-cased `sku`
    async fn exists_by_sku(&self, sku: &str, exclude: Option<ObjectId>) -> ProductResult<bool>;
}
