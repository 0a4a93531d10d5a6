use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use warehouse_core::{AppError, PaginationParams};
use warehouse_models::{
    CreateStockInDto, CreateStockOutDto, PaginatedStockFormsResponse, StockDirection,
    StockFormWithItems,
};

use super::service;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

// ============ Stock-in ============

#[utoipa::path(
    post,
    path = "/api/stock-in",
    request_body = CreateStockInDto,
    responses(
        (status = 201, description = "Stock-in form recorded", body = StockFormWithItems),
        (status = 400, description = "Malformed body or date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Form code already exists"),
        (status = 422, description = "Empty form or non-positive quantity")
    ),
    tag = "Stock",
    security(("bearer_auth" = []))
)]
pub async fn create_stock_in(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateStockInDto>,
) -> Result<(StatusCode, Json<StockFormWithItems>), AppError> {
    let form = service::create_form(&state.db, dto.into(), auth_user.0.user_id()).await?;
    Ok((StatusCode::CREATED, Json(form)))
}

#[utoipa::path(
    get,
    path = "/api/stock-in",
    params(
        ("limit" = Option<i64>, Query, description = "Rows per page"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Stock-in forms, newest first", body = PaginatedStockFormsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Stock",
    security(("bearer_auth" = []))
)]
pub async fn get_stock_in_forms(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedStockFormsResponse>, AppError> {
    let result = service::list_forms(&state.db, StockDirection::In, pagination).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/stock-in/{id}",
    params(("id" = i32, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Stock-in form with items", body = StockFormWithItems),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Form not found")
    ),
    tag = "Stock",
    security(("bearer_auth" = []))
)]
pub async fn get_stock_in_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StockFormWithItems>, AppError> {
    let form = service::get_form(&state.db, StockDirection::In, id).await?;
    Ok(Json(form))
}

// ============ Stock-out ============

#[utoipa::path(
    post,
    path = "/api/stock-out",
    request_body = CreateStockOutDto,
    responses(
        (status = 201, description = "Stock-out form recorded", body = StockFormWithItems),
        (status = 400, description = "Malformed body or date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Form code already exists"),
        (status = 422, description = "Insufficient stock, empty form or non-positive quantity")
    ),
    tag = "Stock",
    security(("bearer_auth" = []))
)]
pub async fn create_stock_out(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateStockOutDto>,
) -> Result<(StatusCode, Json<StockFormWithItems>), AppError> {
    let form = service::create_form(&state.db, dto.into(), auth_user.0.user_id()).await?;
    Ok((StatusCode::CREATED, Json(form)))
}

#[utoipa::path(
    get,
    path = "/api/stock-out",
    params(
        ("limit" = Option<i64>, Query, description = "Rows per page"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Stock-out forms, newest first", body = PaginatedStockFormsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Stock",
    security(("bearer_auth" = []))
)]
pub async fn get_stock_out_forms(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedStockFormsResponse>, AppError> {
    let result = service::list_forms(&state.db, StockDirection::Out, pagination).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/stock-out/{id}",
    params(("id" = i32, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Stock-out form with items", body = StockFormWithItems),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Form not found")
    ),
    tag = "Stock",
    security(("bearer_auth" = []))
)]
pub async fn get_stock_out_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StockFormWithItems>, AppError> {
    let form = service::get_form(&state.db, StockDirection::Out, id).await?;
    Ok(Json(form))
}
