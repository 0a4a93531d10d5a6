use std::collections::{BTreeSet, HashMap};

use anyhow::anyhow;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{info, instrument};
use warehouse_core::AppError;
use warehouse_models::{
    CreateRoleDto, Permission, Role, RoleWithPermissions, SetRolePermissionsDto, UpdateRoleDto,
};

use crate::modules::map_constraint_error;

const ROLE_COLUMNS: &str = "id, name, description, created_at, updated_at";
const DUPLICATE_ROLE: &str = "A role with this name already exists";
const UNKNOWN_PERMISSION: &str = "Permission does not exist";
const ROLE_IN_USE: &str = "Role is assigned to users and cannot be deleted";

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: i32,
    #[sqlx(flatten)]
    permission: Permission,
}

async fn permissions_for_roles(
    db: &PgPool,
    role_ids: &[i32],
) -> Result<HashMap<i32, Vec<Permission>>, AppError> {
    let rows: Vec<RolePermissionRow> = sqlx::query_as(
        "SELECT rp.role_id, p.id, p.name, p.api_path, p.http_method, p.module, p.created_at, p.updated_at \
         FROM role_permissions rp JOIN permissions p ON p.id = rp.permission_id \
         WHERE rp.role_id = ANY($1) ORDER BY p.id",
    )
    .bind(role_ids)
    .fetch_all(db)
    .await?;

    let mut grouped: HashMap<i32, Vec<Permission>> = HashMap::new();
    for row in rows {
        grouped.entry(row.role_id).or_default().push(row.permission);
    }
    Ok(grouped)
}

/// Deduplicated ids; every one must name an existing permission.
async fn checked_permission_ids(
    tx: &mut Transaction<'_, Postgres>,
    permission_ids: &[i32],
) -> Result<Vec<i32>, AppError> {
    let ids: Vec<i32> = permission_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(ids);
    }

    let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM permissions WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_one(&mut **tx)
        .await?;

    if found != ids.len() as i64 {
        return Err(AppError::unprocessable(anyhow!(UNKNOWN_PERMISSION)));
    }
    Ok(ids)
}

async fn link_permissions(
    tx: &mut Transaction<'_, Postgres>,
    role_id: i32,
    permission_ids: &[i32],
) -> Result<(), AppError> {
    if permission_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id) \
         SELECT $1, UNNEST($2::INT[]) ON CONFLICT DO NOTHING",
    )
    .bind(role_id)
    .bind(permission_ids)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_constraint_error(e, DUPLICATE_ROLE, UNKNOWN_PERMISSION))?;
    Ok(())
}

#[instrument(skip(db))]
pub async fn list_roles(db: &PgPool) -> Result<Vec<RoleWithPermissions>, AppError> {
    let roles: Vec<Role> = sqlx::query_as(&format!("SELECT {ROLE_COLUMNS} FROM roles ORDER BY id"))
        .fetch_all(db)
        .await?;

    let ids: Vec<i32> = roles.iter().map(|r| r.id).collect();
    let mut permissions = permissions_for_roles(db, &ids).await?;

    Ok(roles
        .into_iter()
        .map(|role| RoleWithPermissions {
            permissions: permissions.remove(&role.id).unwrap_or_default(),
            role,
        })
        .collect())
}

#[instrument(skip(db))]
pub async fn get_role(db: &PgPool, id: i32) -> Result<RoleWithPermissions, AppError> {
    let role: Role = sqlx::query_as(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

    let permissions = permissions_for_roles(db, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default();

    Ok(RoleWithPermissions { role, permissions })
}

#[instrument(skip(db, dto), fields(name = %dto.name))]
pub async fn create_role(db: &PgPool, dto: CreateRoleDto) -> Result<RoleWithPermissions, AppError> {
    let mut tx = db.begin().await?;

    let role_id: i32 =
        sqlx::query_scalar("INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING id")
            .bind(dto.name.trim())
            .bind(&dto.description)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_constraint_error(e, DUPLICATE_ROLE, UNKNOWN_PERMISSION))?;

    let ids = checked_permission_ids(&mut tx, dto.permission_ids.as_deref().unwrap_or_default()).await?;
    link_permissions(&mut tx, role_id, &ids).await?;

    tx.commit().await?;

    info!(role_id, permissions = ids.len(), "role created");
    get_role(db, role_id).await
}

#[instrument(skip(db, dto))]
pub async fn update_role(db: &PgPool, id: i32, dto: UpdateRoleDto) -> Result<RoleWithPermissions, AppError> {
    let result = sqlx::query(
        "UPDATE roles SET name = COALESCE($2, name), description = COALESCE($3, description), \
         updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(dto.name.as_deref().map(str::trim))
    .bind(&dto.description)
    .execute(db)
    .await
    .map_err(|e| map_constraint_error(e, DUPLICATE_ROLE, UNKNOWN_PERMISSION))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("Role not found")));
    }

    get_role(db, id).await
}

/// Refused while any user still holds the role. The role row stays locked
/// until commit so users cannot be assigned to it in between.
#[instrument(skip(db))]
pub async fn delete_role(db: &PgPool, id: i32) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(AppError::not_found(anyhow!("Role not found")));
    }

    let holders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    if holders > 0 {
        return Err(AppError::conflict(anyhow!(
            "Role is assigned to {holders} user(s) and cannot be deleted"
        )));
    }

    sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_foreign_key_violation()) {
                AppError::conflict(anyhow!(ROLE_IN_USE))
            } else {
                AppError::database(e)
            }
        })?;

    tx.commit().await?;
    info!(role_id = id, "role deleted");
    Ok(())
}

/// Replaces the role's permission set.
#[instrument(skip(db, dto))]
pub async fn set_role_permissions(
    db: &PgPool,
    id: i32,
    dto: SetRolePermissionsDto,
) -> Result<RoleWithPermissions, AppError> {
    let mut tx = db.begin().await?;

    let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(AppError::not_found(anyhow!("Role not found")));
    }

    let ids = checked_permission_ids(&mut tx, &dto.permission_ids).await?;

    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    link_permissions(&mut tx, id, &ids).await?;

    sqlx::query("UPDATE roles SET updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(role_id = id, permissions = ids.len(), "role permissions replaced");
    get_role(db, id).await
}
