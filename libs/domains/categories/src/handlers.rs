use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ApiResponse, DeleteMode, DeleteResponse, FilterQuery, ListResponse, ObjectIdPath,
    ValidatedJson,
    errors::responses::{
        BadRequestIdentifierResponse, BadRequestValidationResponse, DuplicateKeyResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CategoryResult;
use crate::models::{Category, CategorySummary, CategoryView, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;
use crate::service::CategoryService;

/// OpenAPI documentation for Categories API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        create_category,
        get_category,
        update_category,
        delete_category,
    ),
    components(
        schemas(CategoryView, CategorySummary, CreateCategory, UpdateCategory),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdentifierResponse,
            DuplicateKeyResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Categories", description = "Category management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the categories router with all HTTP endpoints
pub fn router<R: CategoryRepository + 'static>(service: Arc<CategoryService<R>>) -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .with_state(service)
}

/// List categories with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Categories",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("isActive" = Option<bool>, Query, description = "Active flag"),
        ("sortBy" = Option<String>, Query, description = "name, createdAt or updatedAt (default name)"),
        ("order" = Option<String>, Query, description = "asc (default) or desc"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 100 (default 10)")
    ),
    responses(
        (status = 200, description = "One page of categories", body = ListResponse<CategoryView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    FilterQuery(query, ..): FilterQuery<Category>,
) -> CategoryResult<Json<ListResponse<CategoryView>>> {
    let (categories, total) = service.list_categories(&query).await?;
    Ok(Json(ListResponse::new(categories, total, &query.page)))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "",
    tag = "Categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryView>),
        (status = 400, response = DuplicateKeyResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CategoryResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    params(
        ("id" = String, Path, description = "Category ObjectId")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryView>),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> CategoryResult<Json<ApiResponse<CategoryView>>> {
    let category = service.get_category(id).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// Update a category; absent fields keep their value
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Categories",
    params(
        ("id" = String, Path, description = "Category ObjectId")
    ),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CategoryResult<Json<ApiResponse<CategoryView>>> {
    let category = service.update_category(id, input).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// Delete a category, or deactivate it with `?logical=true`
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    params(
        ("id" = String, Path, description = "Category ObjectId"),
        ("logical" = Option<bool>, Query, description = "Deactivate instead of removing")
    ),
    responses(
        (status = 200, description = "Category deleted or deactivated", body = DeleteResponse<CategoryView>),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
    mode: DeleteMode,
) -> CategoryResult<Json<DeleteResponse<CategoryView>>> {
    let response = match mode {
        DeleteMode::Logical => {
            let category = service.deactivate_category(id).await?;
            DeleteResponse::deactivated("Category deactivated", category)
        }
        DeleteMode::Physical => {
            service.delete_category(id).await?;
            DeleteResponse::removed("Category deleted successfully")
        }
    };
    Ok(Json(response))
}
