//! Category Service - Business logic layer

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use query_filter::{PopulateSpec, QuerySpec, Reference};
use tracing::instrument;
use validator::Validate;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{
    Category, CategoryPatch, CategorySummary, CategoryView, CreateCategory, PARENT_FULL,
    UpdateCategory,
};
use crate::repository::CategoryRepository;

/// Category lookups needed by domains that reference categories
#[async_trait]
pub trait CategoryResolver: Send + Sync {
    /// Whether a category with `id` exists
    async fn exists(&self, id: ObjectId) -> CategoryResult<bool>;

    /// Fetch `ids` and project each through `spec`, resolving the nested
    /// parent reference when `spec` asks for it. Missing ids are absent
    /// from the result.
    async fn resolve(
        &self,
        ids: Vec<ObjectId>,
        spec: &'static PopulateSpec,
    ) -> CategoryResult<HashMap<ObjectId, CategorySummary>>;
}

/// Category service providing business logic operations
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// One page of categories plus the unpaginated total
    #[instrument(skip(self, query))]
    pub async fn list_categories(
        &self,
        query: &QuerySpec,
    ) -> CategoryResult<(Vec<CategoryView>, u64)> {
        let (categories, total) = tokio::try_join!(
            self.repository.find(query),
            self.repository.count(&query.filter)
        )?;

        let views = self.populate(categories, query.populate).await?;
        Ok((views, total))
    }

    #[instrument(skip(self, input), fields(category_name = %input.name))]
    pub async fn create_category(&self, input: CreateCategory) -> CategoryResult<CategoryView> {
        input.validate()?;
        let parent = parse_parent(input.parent_category.as_deref())?;

        if self.repository.exists_by_name(&input.name, None).await? {
            return Err(CategoryError::DuplicateKey {
                field: "name".to_string(),
                value: input.name,
            });
        }

        let category = self.repository.insert(Category::new(input, parent)).await?;
        self.view(category).await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: ObjectId) -> CategoryResult<CategoryView> {
        let category = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))?;
        self.view(category).await
    }

    /// Merge the present fields of `input` into the category
    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: ObjectId,
        input: UpdateCategory,
    ) -> CategoryResult<CategoryView> {
        input.validate()?;

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))?;

        if let Some(ref new_name) = input.name {
            if new_name != &existing.name
                && self.repository.exists_by_name(new_name, Some(id)).await?
            {
                return Err(CategoryError::DuplicateKey {
                    field: "name".to_string(),
                    value: new_name.clone(),
                });
            }
        }

        let patch = CategoryPatch {
            parent_category: parse_parent(input.parent_category.as_deref())?,
            name: input.name,
            description: input.description,
            is_active: input.is_active,
        };

        let updated = self
            .repository
            .update(id, patch)
            .await?
            .ok_or(CategoryError::NotFound(id))?;
        self.view(updated).await
    }

    /// Logical delete: flip `isActive` and return the record
    #[instrument(skip(self))]
    pub async fn deactivate_category(&self, id: ObjectId) -> CategoryResult<CategoryView> {
        let updated = self
            .repository
            .update(id, CategoryPatch::deactivate())
            .await?
            .ok_or(CategoryError::NotFound(id))?;
        self.view(updated).await
    }

    /// Physical delete
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: ObjectId) -> CategoryResult<()> {
        if !self.repository.delete(id).await? {
            return Err(CategoryError::NotFound(id));
        }
        Ok(())
    }

    /// Single-record view with the full parent embedded
    async fn view(&self, category: Category) -> CategoryResult<CategoryView> {
        let parent = match category.parent_category {
            Some(parent) => {
                let parents = self.resolve(vec![parent], &PARENT_FULL).await?;
                Reference::lookup(parent, &parents)
            }
            None => Reference::Dangling,
        };
        Ok(CategoryView::new(category, parent))
    }

    async fn populate(
        &self,
        categories: Vec<Category>,
        spec: Option<&'static PopulateSpec>,
    ) -> CategoryResult<Vec<CategoryView>> {
        let parents = match spec {
            Some(spec) => {
                let ids = categories.iter().filter_map(|c| c.parent_category).collect();
                self.resolve(ids, spec).await?
            }
            None => HashMap::new(),
        };

        Ok(categories
            .into_iter()
            .map(|category| {
                let parent = match (category.parent_category, spec) {
                    (None, _) => Reference::Dangling,
                    (Some(parent), Some(_)) => Reference::lookup(parent, &parents),
                    (Some(parent), None) => Reference::Id(parent),
                };
                CategoryView::new(category, parent)
            })
            .collect())
    }
}

#[async_trait]
impl<R: CategoryRepository> CategoryResolver for CategoryService<R> {
    #[instrument(skip(self))]
    async fn exists(&self, id: ObjectId) -> CategoryResult<bool> {
        Ok(self.repository.find_by_id(id).await?.is_some())
    }

    async fn resolve(
        &self,
        mut ids: Vec<ObjectId>,
        spec: &'static PopulateSpec,
    ) -> CategoryResult<HashMap<ObjectId, CategorySummary>> {
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let categories = self.repository.find_by_ids(ids).await?;

        // depth is bounded by the static spec chain
        let parents = match spec.nested_for("parentCategory") {
            Some(nested) => {
                let parent_ids = categories.iter().filter_map(|c| c.parent_category).collect();
                self.resolve(parent_ids, nested).await?
            }
            None => HashMap::new(),
        };

        Ok(categories
            .iter()
            .map(|category| (category.id, CategorySummary::project(category, spec, &parents)))
            .collect())
    }
}

fn parse_parent(raw: Option<&str>) -> CategoryResult<Option<ObjectId>> {
    raw.map(|value| {
        ObjectId::parse_str(value).map_err(|_| CategoryError::InvalidIdentifier {
            field: "parentCategory".to_string(),
            value: value.to_string(),
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CATEGORY_QUERY_POLICY, PARENT_SUMMARY};
    use crate::repository::MockCategoryRepository;
    use mockall::predicate::eq;
    use query_filter::compile;

    fn category(name: &str, parent: Option<ObjectId>) -> Category {
        Category::new(
            CreateCategory {
                name: name.to_string(),
                description: Some(format!("All {name}")),
                parent_category: None,
                is_active: true,
            },
            parent,
        )
    }

    fn create(name: &str, parent: Option<&str>) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            description: None,
            parent_category: parent.map(str::to_string),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let mut mock_repo = MockCategoryRepository::new();
        mock_repo
            .expect_exists_by_name()
            .withf(|name, exclude| name == "Tools" && exclude.is_none())
            .returning(|_, _| Ok(true));
        mock_repo.expect_insert().never();

        let service = CategoryService::new(mock_repo);
        let error = service.create_category(create("Tools", None)).await.unwrap_err();

        assert!(matches!(
            error,
            CategoryError::DuplicateKey { ref field, ref value } if field == "name" && value == "Tools"
        ));
    }

    #[tokio::test]
    async fn test_create_embeds_full_parent() {
        let home = category("Home", None);
        let home_id = home.id;
        let parent_hex = home_id.to_hex();

        let mut mock_repo = MockCategoryRepository::new();
        mock_repo.expect_exists_by_name().returning(|_, _| Ok(false));
        mock_repo.expect_insert().returning(|category| Ok(category));
        mock_repo
            .expect_find_by_ids()
            .with(eq(vec![home_id]))
            .returning(move |_| Ok(vec![home.clone()]));

        let service = CategoryService::new(mock_repo);
        let view = service
            .create_category(create("Kitchen", Some(&parent_hex)))
            .await
            .unwrap();

        let parent = view.parent_category.resolved().unwrap();
        assert_eq!(parent.id, parent_hex);
        assert_eq!(parent.name.as_deref(), Some("Home"));
        assert!(parent.created_at.is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_parent_before_store_access() {
        let mut mock_repo = MockCategoryRepository::new();
        mock_repo.expect_exists_by_name().never();

        let service = CategoryService::new(mock_repo);
        let error = service
            .create_category(create("Kitchen", Some("not-an-id")))
            .await
            .unwrap_err();

        assert!(matches!(error, CategoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_to_taken_name_is_duplicate() {
        let tools = category("Tools", None);
        let id = tools.id;

        let mut mock_repo = MockCategoryRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(tools.clone())));
        mock_repo
            .expect_exists_by_name()
            .withf(move |name, exclude| name == "Garden" && *exclude == Some(id))
            .returning(|_, _| Ok(true));
        mock_repo.expect_update().never();

        let service = CategoryService::new(mock_repo);
        let input = UpdateCategory {
            name: Some("Garden".to_string()),
            ..UpdateCategory::default()
        };

        let error = service.update_category(id, input).await.unwrap_err();
        assert!(matches!(error, CategoryError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_update_description_only_patches_description() {
        let tools = category("Tools", None);
        let id = tools.id;
        let found = tools.clone();

        let mut mock_repo = MockCategoryRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        mock_repo.expect_exists_by_name().never();
        mock_repo
            .expect_update()
            .withf(|_, patch| {
                patch.name.is_none() && patch.description.as_deref() == Some("Hand tools")
            })
            .returning(move |_, patch| {
                let mut updated = tools.clone();
                patch.apply(&mut updated, bson_now());
                Ok(Some(updated))
            });

        let service = CategoryService::new(mock_repo);
        let input = UpdateCategory {
            description: Some("Hand tools".to_string()),
            ..UpdateCategory::default()
        };

        let view = service.update_category(id, input).await.unwrap();
        assert_eq!(view.name, "Tools");
        assert_eq!(view.description.as_deref(), Some("Hand tools"));
    }

    #[tokio::test]
    async fn test_missing_category_is_not_found() {
        let id = ObjectId::new();
        let mut mock_repo = MockCategoryRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_update().returning(|_, _| Ok(None));
        mock_repo.expect_delete().returning(|_| Ok(false));

        let service = CategoryService::new(mock_repo);

        assert!(matches!(
            service.get_category(id).await,
            Err(CategoryError::NotFound(missing)) if missing == id
        ));
        assert!(matches!(
            service.deactivate_category(id).await,
            Err(CategoryError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_category(id).await,
            Err(CategoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_populates_parent_summary() {
        let home = category("Home", None);
        let kitchen = category("Kitchen", Some(home.id));
        let orphan = category("Orphan", Some(ObjectId::new()));
        let page = vec![kitchen.clone(), orphan.clone()];
        let parents = vec![home.clone()];

        let mut mock_repo = MockCategoryRepository::new();
        mock_repo.expect_find().returning(move |_| Ok(page.clone()));
        mock_repo.expect_count().returning(|_| Ok(12));
        mock_repo
            .expect_find_by_ids()
            .returning(move |_| Ok(parents.clone()));

        let service = CategoryService::new(mock_repo);
        let query = compile(&CATEGORY_QUERY_POLICY.check(&Default::default()).unwrap());
        assert_eq!(query.populate, Some(&PARENT_SUMMARY));

        let (views, total) = service.list_categories(&query).await.unwrap();
        assert_eq!(total, 12);

        let parent = views[0].parent_category.resolved().unwrap();
        assert_eq!(parent.name.as_deref(), Some("Home"));
        assert_eq!(parent.created_at, None);
        assert_eq!(views[1].parent_category, Reference::Dangling);
    }

    #[tokio::test]
    async fn test_resolve_follows_nested_spec() {
        static GRANDPARENT: PopulateSpec = PopulateSpec::new("parentCategory").select(&["name"]);
        static WITH_PARENT: PopulateSpec = PopulateSpec::new("category")
            .select(&["name", "parentCategory"])
            .nested(&GRANDPARENT);

        let home = category("Home", None);
        let kitchen = category("Kitchen", Some(home.id));
        let (home_id, kitchen_id) = (home.id, kitchen.id);

        let mut mock_repo = MockCategoryRepository::new();
        mock_repo
            .expect_find_by_ids()
            .with(eq(vec![kitchen_id]))
            .returning(move |_| Ok(vec![kitchen.clone()]));
        mock_repo
            .expect_find_by_ids()
            .with(eq(vec![home_id]))
            .returning(move |_| Ok(vec![home.clone()]));

        let service = CategoryService::new(mock_repo);
        let resolved = service
            .resolve(vec![kitchen_id, kitchen_id], &WITH_PARENT)
            .await
            .unwrap();

        let summary = &resolved[&kitchen_id];
        assert_eq!(summary.description, None);
        let parent = summary.parent_category.as_ref().unwrap().resolved().unwrap();
        assert_eq!(parent.name.as_deref(), Some("Home"));
        assert_eq!(parent.parent_category, None);
    }

    fn bson_now() -> mongodb::bson::DateTime {
        mongodb::bson::DateTime::now()
    }
}
