use std::collections::BTreeMap;
use std::sync::LazyLock;

use axum_helpers::serde_helpers::{trimmed, trimmed_opt};
use axum_helpers::validators::{object_id, url_list};
use chrono::{DateTime, Utc};
use domain_categories::{CategorySummary, PARENT_FULL, to_chrono};
use mongodb::bson::{self, Document, oid::ObjectId};
use query_filter::{
    FieldRule, Filterable, MatchMode, NumberKind, PopulateSpec, QueryPolicy, Reference, SortOrder,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

static SKU_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("SKU pattern compiles"));

/// Parent of the embedded category in product lists
pub static CATEGORY_PARENT: PopulateSpec =
    PopulateSpec::new("parentCategory").select(&["name", "description"]);

/// Category embedded in product lists
pub static CATEGORY_SUMMARY: PopulateSpec = PopulateSpec::new("category")
    .select(&["name", "description", "isActive", "parentCategory"])
    .nested(&CATEGORY_PARENT);

/// Category embedded in single-product responses
pub static CATEGORY_FULL: PopulateSpec = PopulateSpec::new("category").nested(&PARENT_FULL);

/// `GET /api/products` parameters
pub static PRODUCT_QUERY_POLICY: QueryPolicy = QueryPolicy {
    fields: &[
        FieldRule::new("name", "name", MatchMode::Contains),
        FieldRule::new("price", "price", MatchMode::Range(NumberKind::Decimal)),
        FieldRule::new("stock", "stock", MatchMode::Range(NumberKind::Integer)),
        FieldRule::new("category", "category", MatchMode::Reference),
        FieldRule::new("sku", "sku", MatchMode::ExactUppercase),
        FieldRule::new("isAvailable", "isAvailable", MatchMode::Flag),
        FieldRule::new("supplierName", "supplier.name", MatchMode::Contains),
        FieldRule::new("text", "$text", MatchMode::FullText),
    ],
    sortable: &["name", "price", "stock", "createdAt", "updatedAt"],
    default_sort: "createdAt",
    default_order: SortOrder::Desc,
    populate: Some(&CATEGORY_SUMMARY),
};

/// Who supplies a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 2, message = "Supplier name must be at least 2 characters"))]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed_opt", skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Product document as stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_price: Option<f64>,
    /// Always upper-case
    pub sku: String,
    pub stock: i64,
    pub category: ObjectId,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Supplier>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl Filterable for Product {
    fn query_policy() -> &'static QueryPolicy {
        &PRODUCT_QUERY_POLICY
    }
}

impl Product {
    /// Build a new document; `category` must already be checked
    pub fn new(input: CreateProduct, category: ObjectId) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: ObjectId::new(),
            name: input.name,
            description: input.description,
            price: input.price,
            compare_price: input.compare_price,
            sku: input.sku.to_uppercase(),
            stock: input.stock,
            category,
            images: input.images,
            specifications: input.specifications,
            is_available: input.is_available,
            supplier: input.supplier,
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_true() -> bool {
    true
}

/// DTO for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 3,
        max = 100,
        message = "Product name must be between 3 and 100 characters"
    ))]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Compare price cannot be negative"))]
    pub compare_price: Option<f64>,
    /// Letters, digits and hyphens; stored upper-cased
    #[serde(deserialize_with = "trimmed")]
    #[validate(
        length(min = 3, max = 20, message = "SKU must be between 3 and 20 characters"),
        regex(
            path = *SKU_PATTERN,
            message = "SKU may only contain letters, numbers and hyphens"
        )
    )]
    pub sku: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,
    /// Id of an existing category
    #[validate(custom(function = "object_id"))]
    pub category: String,
    #[serde(default)]
    #[validate(custom(function = "url_list"))]
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    #[validate(nested)]
    pub supplier: Option<Supplier>,
}

/// DTO for updating a product; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = 3,
        max = 100,
        message = "Product name must be between 3 and 100 characters"
    ))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, message = "Compare price cannot be negative"))]
    pub compare_price: Option<f64>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(
        length(min = 3, max = 20, message = "SKU must be between 3 and 20 characters"),
        regex(
            path = *SKU_PATTERN,
            message = "SKU may only contain letters, numbers and hyphens"
        )
    )]
    pub sku: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i64>,
    #[validate(custom(function = "object_id"))]
    pub category: Option<String>,
    #[validate(custom(function = "url_list"))]
    pub images: Option<Vec<String>>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub is_available: Option<bool>,
    #[validate(nested)]
    pub supplier: Option<Supplier>,
}

/// Field changes applied by an update; only present fields are written
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Supplier>,
}

impl ProductPatch {
    pub fn deactivate() -> Self {
        Self {
            is_available: Some(false),
            ..Self::default()
        }
    }

    /// `$set` document, `updatedAt` included
    pub fn to_set_document(&self, now: bson::DateTime) -> Result<Document, bson::ser::Error> {
        let mut set = bson::to_document(self)?;
        set.insert("updatedAt", now);
        Ok(set)
    }

    /// Merge into an in-memory record; used by mocks and in-memory repositories
    pub fn apply(&self, product: &mut Product, now: bson::DateTime) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if self.compare_price.is_some() {
            product.compare_price = self.compare_price;
        }
        if let Some(sku) = &self.sku {
            product.sku = sku.clone();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
        if let Some(specifications) = &self.specifications {
            product.specifications = specifications.clone();
        }
        if let Some(is_available) = self.is_available {
            product.is_available = is_available;
        }
        if let Some(supplier) = &self.supplier {
            product.supplier = Some(supplier.clone());
        }
        product.updated_at = now;
    }
}

/// Product as returned by the products API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_price: Option<f64>,
    pub sku: String,
    pub stock: i64,
    /// Category id, the embedded category, or `null` when it no longer exists
    #[schema(value_type = Object)]
    pub category: Reference<CategorySummary>,
    pub images: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Supplier>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    pub fn new(product: Product, category: Reference<CategorySummary>) -> Self {
        Self {
            id: product.id.to_hex(),
            name: product.name,
            description: product.description,
            price: product.price,
            compare_price: product.compare_price,
            sku: product.sku,
            stock: product.stock,
            category,
            images: product.images,
            specifications: product.specifications,
            is_available: product.is_available,
            supplier: product.supplier,
            created_at: to_chrono(product.created_at),
            updated_at: to_chrono(product.updated_at),
        }
    }
}
