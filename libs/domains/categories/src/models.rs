use std::collections::HashMap;

use axum_helpers::serde_helpers::{trimmed, trimmed_opt};
use axum_helpers::validators::object_id;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document, oid::ObjectId};
use query_filter::{
    FieldRule, Filterable, MatchMode, PopulateSpec, QueryPolicy, Reference, SortOrder,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Parent projection embedded in category lists
pub static PARENT_SUMMARY: PopulateSpec =
    PopulateSpec::new("parentCategory").select(&["name", "description", "isActive"]);

/// Parent embedded in single-category responses
pub static PARENT_FULL: PopulateSpec = PopulateSpec::new("parentCategory");

/// `GET /api/categories` parameters
pub static CATEGORY_QUERY_POLICY: QueryPolicy = QueryPolicy {
    fields: &[
        FieldRule::new("name", "name", MatchMode::Contains),
        FieldRule::new("isActive", "isActive", MatchMode::Flag),
    ],
    sortable: &["name", "createdAt", "updatedAt"],
    default_sort: "name",
    default_order: SortOrder::Asc,
    populate: Some(&PARENT_SUMMARY),
};

/// Convert a stored timestamp for JSON output
pub fn to_chrono(timestamp: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp.timestamp_millis()).unwrap_or_default()
}

/// Category document as stored in the `categories` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Not guaranteed to exist or to form an acyclic tree
    #[serde(default)]
    pub parent_category: Option<ObjectId>,
    pub is_active: bool,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl Filterable for Category {
    fn query_policy() -> &'static QueryPolicy {
        &CATEGORY_QUERY_POLICY
    }
}

impl Category {
    /// Build a new document; `parent_category` must already be parsed
    pub fn new(input: CreateCategory, parent_category: Option<ObjectId>) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: ObjectId::new(),
            name: input.name,
            description: input.description,
            parent_category,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_true() -> bool {
    true
}

/// DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 2,
        max = 50,
        message = "Category name must be between 2 and 50 characters"
    ))]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
    #[validate(custom(function = "object_id"))]
    pub parent_category: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// DTO for updating a category; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = 2,
        max = 50,
        message = "Category name must be between 2 and 50 characters"
    ))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
    #[validate(custom(function = "object_id"))]
    pub parent_category: Option<String>,
    pub is_active: Option<bool>,
}

/// Field changes applied by an update; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_category: Option<ObjectId>,
    pub is_active: Option<bool>,
}

impl CategoryPatch {
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }

    /// `$set` document, `updatedAt` included
    pub fn to_set_document(&self, now: bson::DateTime) -> Document {
        let mut set = Document::new();
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(description) = &self.description {
            set.insert("description", description.as_str());
        }
        if let Some(parent) = self.parent_category {
            set.insert("parentCategory", parent);
        }
        if let Some(is_active) = self.is_active {
            set.insert("isActive", is_active);
        }
        set.insert("updatedAt", now);
        set
    }

    /// Merge into an in-memory record; used by mocks and in-memory repositories
    pub fn apply(&self, category: &mut Category, now: bson::DateTime) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(description) = &self.description {
            category.description = Some(description.clone());
        }
        if let Some(parent) = self.parent_category {
            category.parent_category = Some(parent);
        }
        if let Some(is_active) = self.is_active {
            category.is_active = is_active;
        }
        category.updated_at = now;
    }
}

/// A category embedded in another record.
///
/// Fields outside the populate projection are omitted. `parentCategory` is an
/// id when it was not resolved, the parent when it was, and `null` when there
/// is no parent or the parent no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub parent_category: Option<Reference<CategorySummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CategorySummary {
    /// Project `category` through `spec`; `parents` holds its resolved parents
    pub fn project(
        category: &Category,
        spec: &PopulateSpec,
        parents: &HashMap<ObjectId, CategorySummary>,
    ) -> Self {
        let parent_category = spec.selects("parentCategory").then(|| {
            match (category.parent_category, spec.nested_for("parentCategory")) {
                (None, _) => Reference::Dangling,
                (Some(parent), Some(_)) => Reference::lookup(parent, parents),
                (Some(parent), None) => Reference::Id(parent),
            }
        });

        Self {
            id: category.id.to_hex(),
            name: spec.selects("name").then(|| category.name.clone()),
            description: spec
                .selects("description")
                .then(|| category.description.clone())
                .flatten(),
            parent_category,
            is_active: spec.selects("isActive").then_some(category.is_active),
            created_at: spec
                .selects("createdAt")
                .then(|| to_chrono(category.created_at)),
            updated_at: spec
                .selects("updatedAt")
                .then(|| to_chrono(category.updated_at)),
        }
    }
}

/// Category as returned by the categories API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent id, the embedded parent, or `null`
    #[schema(value_type = Option<Object>)]
    pub parent_category: Reference<CategorySummary>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryView {
    pub fn new(category: Category, parent_category: Reference<CategorySummary>) -> Self {
        Self {
            id: category.id.to_hex(),
            name: category.name,
            description: category.description,
            parent_category,
            is_active: category.is_active,
            created_at: to_chrono(category.created_at),
            updated_at: to_chrono(category.updated_at),
        }
    }
}
