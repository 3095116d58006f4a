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

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, ProductView, Supplier, UpdateProduct};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(ProductView, CreateProduct, UpdateProduct, Supplier),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdentifierResponse,
            DuplicateKeyResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: Arc<ProductService<R>>) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(service)
}

/// List products with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("priceMin" = Option<f64>, Query, description = "Lowest price, inclusive"),
        ("priceMax" = Option<f64>, Query, description = "Highest price, inclusive"),
        ("stockMin" = Option<i64>, Query, description = "Lowest stock, inclusive"),
        ("stockMax" = Option<i64>, Query, description = "Highest stock, inclusive"),
        ("category" = Option<String>, Query, description = "Category ObjectId"),
        ("sku" = Option<String>, Query, description = "Exact SKU, case-insensitive"),
        ("isAvailable" = Option<bool>, Query, description = "Availability flag"),
        ("supplierName" = Option<String>, Query, description = "Case-insensitive substring of the supplier name"),
        ("text" = Option<String>, Query, description = "Full-text search over name, description and supplier"),
        ("sortBy" = Option<String>, Query, description = "name, price, stock, createdAt or updatedAt (default createdAt)"),
        ("order" = Option<String>, Query, description = "asc or desc (default desc)"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 100 (default 10)")
    ),
    responses(
        (status = 200, description = "One page of products", body = ListResponse<ProductView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    FilterQuery(query, ..): FilterQuery<Product>,
) -> ProductResult<Json<ListResponse<ProductView>>> {
    let (products, total) = service.list_products(&query).await?;
    Ok(Json(ListResponse::new(products, total, &query.page)))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = ApiResponse<ProductView>),
        (status = 400, response = DuplicateKeyResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ObjectId")
    ),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductView>),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> ProductResult<Json<ApiResponse<ProductView>>> {
    let product = service.get_product(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Update a product; absent fields keep their value
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ObjectId")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = ApiResponse<ProductView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<ApiResponse<ProductView>>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Delete a product, or mark it unavailable with `?logical=true`
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ObjectId"),
        ("logical" = Option<bool>, Query, description = "Mark unavailable instead of removing")
    ),
    responses(
        (status = 200, description = "Product deleted or deactivated", body = DeleteResponse<ProductView>),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
    mode: DeleteMode,
) -> ProductResult<Json<DeleteResponse<ProductView>>> {
    let response = match mode {
        DeleteMode::Logical => {
            let product = service.deactivate_product(id).await?;
            DeleteResponse::deactivated("Product deactivated", product)
        }
        DeleteMode::Physical => {
            service.delete_product(id).await?;
            DeleteResponse::removed("Product permanently deleted")
        }
    };
    Ok(Json(response))
}
