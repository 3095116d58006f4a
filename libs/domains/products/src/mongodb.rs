//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use query_filter::{Filter, QuerySpec};
use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{Product, ProductPatch};
use crate::repository::ProductRepository;

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    /// Create a new MongoProductRepository
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Product>("products");
        Self { collection }
    }

    /// Initialize indexes for optimal query performance
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            // Unique SKU index
            IndexModel::builder()
                .keys(doc! { "sku": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_sku_unique".to_string())
                        .build(),
                )
                .build(),
            // Full-text search for the `text` parameter
            IndexModel::builder()
                .keys(doc! {
                    "name": "text",
                    "description": "text",
                    "supplier.name": "text",
                })
                .options(
                    IndexOptions::builder()
                        .name("idx_text_search".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
            // Price range queries
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_price".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_sku = %product.sku))]
    async fn insert(&self, product: Product) -> ProductResult<Product> {
        self.collection.insert_one(&product).await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(product)
    }

    #[instrument(skip(self, query))]
    async fn find(&self, query: &QuerySpec) -> ProductResult<Vec<Product>> {
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
        let products: Vec<Product> = cursor.try_collect().await?;

        tracing::debug!(count = products.len(), "Products fetched");
        Ok(products)
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, filter: &Filter) -> ProductResult<u64> {
        let count = self.collection.count_documents(filter.to_document()).await?;
        Ok(count)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: ObjectId, patch: ProductPatch) -> ProductResult<Option<Product>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let set = patch.to_set_document(bson::DateTime::now())?;
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .with_options(options)
            .await?;

        if updated.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> ProductResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn exists_by_sku(&self, sku: &str, exclude: Option<ObjectId>) -> ProductResult<bool> {
        let mut filter = doc! { "sku": sku };
        if let Some(id) = exclude {
            filter.insert("_id", doc! { "$ne": id });
        }
        let count = self.collection.count_documents(filter).await?;
        Ok(count > 0)
    }
}
