use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use warehouse_core::{AppError, PaginationParams};
use warehouse_models::{
    CreateProductDto, PaginatedProductsResponse, Product, ProductFilterParams, UpdateProductDto,
};

use super::service;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("search" = Option<String>, Query, description = "Search code or name"),
        ("limit" = Option<i64>, Query, description = "Rows per page"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "List of products", body = PaginatedProductsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
pub async fn get_products(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedProductsResponse>, AppError> {
    let result = service::list_products(&state.db, filters, pagination).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/products/{productCode}",
    params(("productCode" = String, Path, description = "Product code")),
    responses(
        (status = 200, description = "Product details", body = Product),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found")
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Product>, AppError> {
    let product = service::get_product(&state.db, &code).await?;
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductDto,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Product code already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateProductDto>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = service::create_product(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{productCode}",
    params(("productCode" = String, Path, description = "Product code")),
    request_body = UpdateProductDto,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found")
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateProductDto>,
) -> Result<Json<Product>, AppError> {
    let product = service::update_product(&state.db, &code, dto).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{productCode}",
    params(("productCode" = String, Path, description = "Product code")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product has stock movements")
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    service::delete_product(&state.db, &code).await?;
    Ok(StatusCode::NO_CONTENT)
}
