use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use query_filter::{Filter, QuerySpec};

use crate::error::CategoryResult;
use crate::models::{Category, CategoryPatch};

/// Repository trait for Category persistence
///
/// Unique name violations surface as [`CategoryError::DuplicateKey`](crate::CategoryError::DuplicateKey).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, category: Category) -> CategoryResult<Category>;

    async fn find_by_id(&self, id: ObjectId) -> CategoryResult<Option<Category>>;

    /// Every category whose id is in `ids`, in no particular order
    async fn find_by_ids(&self, ids: Vec<ObjectId>) -> CategoryResult<Vec<Category>>;

    /// One page of categories matching the compiled query
    async fn find(&self, query: &QuerySpec) -> CategoryResult<Vec<Category>>;

    /// Matching categories across all pages
    async fn count(&self, filter: &Filter) -> CategoryResult<u64>;

    /// Apply `patch`; `None` when no category has `id`
    async fn update(&self, id: ObjectId, patch: CategoryPatch) -> CategoryResult<Option<Category>>;

    /// Remove the category; `false` when no category has `id`
    async fn delete(&self, id: ObjectId) -> CategoryResult<bool>;

    /// Whether another category (not `exclude`) already uses `name`
    async fn exists_by_name(&self, name: &str, exclude: Option<ObjectId>) -> CategoryResult<bool>;
}
