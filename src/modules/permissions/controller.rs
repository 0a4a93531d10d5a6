use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use warehouse_core::{AppError, PaginationParams};
use warehouse_models::{
    CreatePermissionDto, PaginatedPermissionsResponse, Permission, PermissionFilterParams,
    UpdatePermissionDto,
};

use super::service;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/admin/permissions",
    params(
        ("module" = Option<String>, Query, description = "Filter by module"),
        ("http_method" = Option<String>, Query, description = "Filter by HTTP method"),
        ("limit" = Option<i64>, Query, description = "Rows per page"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "List of permissions", body = PaginatedPermissionsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permissions(
    State(state): State<AppState>,
    Query(filters): Query<PermissionFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedPermissionsResponse>, AppError> {
    let result = service::list_permissions(&state.db, filters, pagination).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/admin/permissions/{id}",
    params(("id" = i32, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Permission details", body = Permission),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Permission not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Permission>, AppError> {
    let permission = service::get_permission(&state.db, id).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    post,
    path = "/api/admin/permissions",
    request_body = CreatePermissionDto,
    responses(
        (status = 201, description = "Permission created", body = Permission),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Path and method already registered"),
        (status = 422, description = "Validation error")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn create_permission(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreatePermissionDto>,
) -> Result<(StatusCode, Json<Permission>), AppError> {
    let permission = service::create_permission(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

#[utoipa::path(
    put,
    path = "/api/admin/permissions/{id}",
    params(("id" = i32, Path, description = "Permission ID")),
    request_body = UpdatePermissionDto,
    responses(
        (status = 200, description = "Permission updated", body = Permission),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Permission not found"),
        (status = 409, description = "Path and method already registered")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn update_permission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdatePermissionDto>,
) -> Result<Json<Permission>, AppError> {
    let permission = service::update_permission(&state.db, id, dto).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    delete,
    path = "/api/admin/permissions/{id}",
    params(("id" = i32, Path, description = "Permission ID")),
    responses(
        (status = 204, description = "Permission deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Permission not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn delete_permission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    service::delete_permission(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
