use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use warehouse_core::{AppError, PaginationMeta, PaginationParams};
use warehouse_models::{
    CreatePermissionDto, PaginatedPermissionsResponse, Permission, PermissionFilterParams,
    UpdatePermissionDto,
};

use crate::modules::map_constraint_error;

const PERMISSION_SELECT: &str =
    "SELECT id, name, api_path, http_method, module, created_at, updated_at FROM permissions";
const DUPLICATE_PERMISSION: &str = "A permission for this path and method already exists";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &PermissionFilterParams) {
    qb.push(" WHERE 1=1");
    if let Some(module) = filters.module.as_deref().filter(|m| !m.is_empty()) {
        qb.push(" AND module = ").push_bind(module.to_string());
    }
    if let Some(method) = filters.http_method.as_deref().filter(|m| !m.is_empty()) {
        qb.push(" AND http_method = ").push_bind(method.to_ascii_uppercase());
    }
}

#[instrument(skip(db))]
pub async fn list_permissions(
    db: &PgPool,
    filters: PermissionFilterParams,
    pagination: PaginationParams,
) -> Result<PaginatedPermissionsResponse, AppError> {
    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM permissions");
    push_filters(&mut count_query, &filters);
    let total: i64 = count_query.build_query_scalar().fetch_one(db).await?;

    let mut query = QueryBuilder::new(PERMISSION_SELECT);
    push_filters(&mut query, &filters);
    query
        .push(" ORDER BY module, id LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());
    let permissions: Vec<Permission> = query.build_query_as().fetch_all(db).await?;

    let meta = PaginationMeta::new(&pagination, total, permissions.len());
    Ok(PaginatedPermissionsResponse {
        data: permissions,
        meta,
    })
}

#[instrument(skip(db))]
pub async fn get_permission(db: &PgPool, id: i32) -> Result<Permission, AppError> {
    sqlx::query_as::<_, Permission>(&format!("{PERMISSION_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Permission not found")))
}

#[instrument(skip(db))]
pub async fn create_permission(db: &PgPool, dto: CreatePermissionDto) -> Result<Permission, AppError> {
    let permission = sqlx::query_as::<_, Permission>(
        "INSERT INTO permissions (name, api_path, http_method, module) VALUES ($1, $2, $3, $4) \
         RETURNING id, name, api_path, http_method, module, created_at, updated_at",
    )
    .bind(dto.name.trim())
    .bind(dto.api_path.trim())
    .bind(dto.http_method.to_ascii_uppercase())
    .bind(dto.module.trim())
    .fetch_one(db)
    .await
    .map_err(|e| map_constraint_error(e, DUPLICATE_PERMISSION, DUPLICATE_PERMISSION))?;

    info!(
        permission_id = permission.id,
        method = %permission.http_method,
        api_path = %permission.api_path,
        "permission created"
    );
    Ok(permission)
}

#[instrument(skip(db))]
pub async fn update_permission(
    db: &PgPool,
    id: i32,
    dto: UpdatePermissionDto,
) -> Result<Permission, AppError> {
    sqlx::query_as::<_, Permission>(
        "UPDATE permissions SET \
            name = COALESCE($2, name), \
            api_path = COALESCE($3, api_path), \
            http_method = COALESCE($4, http_method), \
            module = COALESCE($5, module), \
            updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, name, api_path, http_method, module, created_at, updated_at",
    )
    .bind(id)
    .bind(dto.name.as_deref().map(str::trim))
    .bind(dto.api_path.as_deref().map(str::trim))
    .bind(dto.http_method.as_deref().map(str::to_ascii_uppercase))
    .bind(dto.module.as_deref().map(str::trim))
    .fetch_optional(db)
    .await
    .map_err(|e| map_constraint_error(e, DUPLICATE_PERMISSION, DUPLICATE_PERMISSION))?
    .ok_or_else(|| AppError::not_found(anyhow!("Permission not found")))
}

/// Role links are removed with the permission.
#[instrument(skip(db))]
pub async fn delete_permission(db: &PgPool, id: i32) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("Permission not found")));
    }

    info!(permission_id = id, "permission deleted");
    Ok(())
}
