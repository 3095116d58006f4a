//! Product Service - Business logic layer

use std::collections::HashMap;
use std::sync::Arc;

use domain_categories::CategoryResolver;
use mongodb::bson::oid::ObjectId;
use query_filter::{PopulateSpec, QuerySpec, Reference};
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CATEGORY_FULL, CreateProduct, Product, ProductPatch, ProductView, UpdateProduct,
};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// The service layer handles validation, reference checks and duplicate
/// detection, and resolves the category embedded in every response.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    categories: Arc<dyn CategoryResolver>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository and category lookup
    pub fn new(repository: R, categories: Arc<dyn CategoryResolver>) -> Self {
        Self {
            repository: Arc::new(repository),
            categories,
        }
    }

    /// One page of products plus the unpaginated total
    #[instrument(skip(self, query))]
    pub async fn list_products(
        &self,
        query: &QuerySpec,
    ) -> ProductResult<(Vec<ProductView>, u64)> {
        let (products, total) = tokio::try_join!(
            self.repository.find(query),
            self.repository.count(&query.filter)
        )?;

        let views = self.populate(products, query.populate).await?;
        Ok((views, total))
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<ProductView> {
        input.validate()?;
        let category = self.existing_category(&input.category).await?;

        let sku = input.sku.to_uppercase();
        if self.repository.exists_by_sku(&sku, None).await? {
            return Err(ProductError::DuplicateKey {
                field: "sku".to_string(),
                value: sku,
            });
        }

        let product = self.repository.insert(Product::new(input, category)).await?;
        self.view(product).await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ObjectId) -> ProductResult<ProductView> {
        let product = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;
        self.view(product).await
    }

    /// Merge the present fields of `input` into the product
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: ObjectId,
        input: UpdateProduct,
    ) -> ProductResult<ProductView> {
        input.validate()?;

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let category = match input.category.as_deref() {
            Some(raw) => Some(self.existing_category(raw).await?),
            None => None,
        };

        let sku = input.sku.as_deref().map(str::to_uppercase);
        if let Some(ref new_sku) = sku {
            if new_sku != &existing.sku && self.repository.exists_by_sku(new_sku, Some(id)).await? {
                return Err(ProductError::DuplicateKey {
                    field: "sku".to_string(),
                    value: new_sku.clone(),
                });
            }
        }

        let patch = ProductPatch {
            name: input.name,
            description: input.description,
            price: input.price,
            compare_price: input.compare_price,
            sku,
            stock: input.stock,
            category,
            images: input.images,
            specifications: input.specifications,
            is_available: input.is_available,
            supplier: input.supplier,
        };

        let updated = self
            .repository
            .update(id, patch)
            .await?
            .ok_or(ProductError::NotFound(id))?;
        self.view(updated).await
    }

    /// Logical delete: flip `isAvailable` and return the record
    #[instrument(skip(self))]
    pub async fn deactivate_product(&self, id: ObjectId) -> ProductResult<ProductView> {
        let updated = self
            .repository
            .update(id, ProductPatch::deactivate())
            .await?
            .ok_or(ProductError::NotFound(id))?;
        self.view(updated).await
    }

    /// Physical delete
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ObjectId) -> ProductResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    /// Parse `raw` and check that the category exists
    async fn existing_category(&self, raw: &str) -> ProductResult<ObjectId> {
        let id = ObjectId::parse_str(raw).map_err(|_| ProductError::InvalidIdentifier {
            field: "category".to_string(),
            value: raw.to_string(),
        })?;

        if !self.categories.exists(id).await? {
            tracing::info!(category_id = %id, "Product references a missing category");
            return Err(ProductError::InvalidReference {
                field: "category".to_string(),
                value: raw.to_string(),
            });
        }
        Ok(id)
    }

    /// Single-record view with the full category and its parent embedded
    async fn view(&self, product: Product) -> ProductResult<ProductView> {
        let categories = self
            .categories
            .resolve(vec![product.category], &CATEGORY_FULL)
            .await?;
        let category = Reference::lookup(product.category, &categories);
        Ok(ProductView::new(product, category))
    }

    async fn populate(
        &self,
        products: Vec<Product>,
        spec: Option<&'static PopulateSpec>,
    ) -> ProductResult<Vec<ProductView>> {
        let categories = match spec {
            Some(spec) => {
                let ids = products.iter().map(|p| p.category).collect();
                self.categories.resolve(ids, spec).await?
            }
            None => HashMap::new(),
        };

        Ok(products
            .into_iter()
            .map(|product| {
                let category = match spec {
                    Some(_) => Reference::lookup(product.category, &categories),
                    None => Reference::Id(product.category),
                };
                ProductView::new(product, category)
            })
            .collect())
    }
}
