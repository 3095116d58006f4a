//! MongoDB implementation of CategoryRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use query_filter::{Filter, QuerySpec};
use tracing::instrument;

use crate::error::CategoryResult;
use crate::models::{Category, CategoryPatch};
use crate::repository::CategoryRepository;

/// MongoDB implementation of the CategoryRepository
pub struct MongoCategoryRepository {
    collection: Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Category>("categories");
        Self { collection }
    }

    /// Unique name, plus the parent lookup used by population
    pub async fn init_indexes(&self) -> CategoryResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_name_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "parentCategory": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_parent_category".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Category indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[instrument(skip(self, category), fields(category_name = %category.name))]
    async fn insert(&self, category: Category) -> CategoryResult<Category> {
        self.collection.insert_one(&category).await?;

        tracing::info!(category_id = %category.id, "Category created successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> CategoryResult<Option<Category>> {
        let category = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(category)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: Vec<ObjectId>) -> CategoryResult<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, query))]
    async fn find(&self, query: &QuerySpec) -> CategoryResult<Vec<Category>> {
        let options = FindOptions::builder()
            .sort(query.sort.to_document())
            .skip(query.skip())
            .limit(query.limit())
            .build();

        let cursor = self
            .collection
            .find(query.filter.to_document())
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, filter: &Filter) -> CategoryResult<u64> {
        let count = self.collection.count_documents(filter.to_document()).await?;
        Ok(count)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: ObjectId, patch: CategoryPatch) -> CategoryResult<Option<Category>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": patch.to_set_document(bson::DateTime::now()) },
            )
            .with_options(options)
            .await?;

        if updated.is_some() {
            tracing::info!(category_id = %id, "Category updated successfully");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> CategoryResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count > 0 {
            tracing::info!(category_id = %id, "Category deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn exists_by_name(&self, name: &str, exclude: Option<ObjectId>) -> CategoryResult<bool> {
        let mut filter = doc! { "name": name };
        if let Some(id) = exclude {
            filter.insert("_id", doc! { "$ne": id });
        }
        let count = self.collection.count_documents(filter).await?;
        Ok(count > 0)
    }
}
