use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use warehouse_core::{AppError, PaginationMeta, PaginationParams, hash_password};
use warehouse_models::{CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams};

use crate::modules::map_constraint_error;

const USER_SELECT: &str = "SELECT u.id, u.username, u.email, u.full_name, u.phone_number, \
     u.address, u.is_active, u.role_id, r.name AS role_name, u.created_at, u.updated_at \
     FROM users u LEFT JOIN roles r ON r.id = u.role_id";

const DUPLICATE_USER: &str = "A user with this username or email already exists";
const UNKNOWN_ROLE: &str = "Role does not exist";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &UserFilterParams) {
    qb.push(" WHERE 1=1");

    if let Some(search) = filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{search}%");
        qb.push(" AND (u.username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.full_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role_id) = filters.role_id {
        qb.push(" AND u.role_id = ").push_bind(role_id);
    }
    if let Some(is_active) = filters.is_active {
        qb.push(" AND u.is_active = ").push_bind(is_active);
    }
}

#[instrument(skip(db))]
pub async fn list_users(
    db: &PgPool,
    filters: UserFilterParams,
    pagination: PaginationParams,
) -> Result<PaginatedUsersResponse, AppError> {
    let mut count_query =
        QueryBuilder::new("SELECT COUNT(*) FROM users u LEFT JOIN roles r ON r.id = u.role_id");
    push_filters(&mut count_query, &filters);
    let total: i64 = count_query.build_query_scalar().fetch_one(db).await?;

    let mut query = QueryBuilder::new(USER_SELECT);
    push_filters(&mut query, &filters);
    query
        .push(" ORDER BY u.id LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());
    let users: Vec<User> = query.build_query_as().fetch_all(db).await?;

    let meta = PaginationMeta::new(&pagination, total, users.len());
    Ok(PaginatedUsersResponse { data: users, meta })
}

#[instrument(skip(db))]
pub async fn get_user(db: &PgPool, id: i32) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
}

#[instrument(skip(db, dto), fields(username = %dto.username))]
pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
    let password_hash = hash_password(&dto.password)?;

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (username, email, full_name, password, phone_number, address, is_active, role_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
    )
    .bind(&dto.username)
    .bind(&dto.email)
    .bind(&dto.full_name)
    .bind(&password_hash)
    .bind(&dto.phone_number)
    .bind(&dto.address)
    .bind(dto.is_active.unwrap_or(true))
    .bind(dto.role_id)
    .fetch_one(db)
    .await
    .map_err(|e| map_constraint_error(e, DUPLICATE_USER, UNKNOWN_ROLE))?;

    info!(user_id = id, role_id = ?dto.role_id, "user created");
    get_user(db, id).await
}

#[instrument(skip(db, dto))]
pub async fn update_user(db: &PgPool, id: i32, dto: UpdateUserDto) -> Result<User, AppError> {
    let password_hash = dto.password.as_deref().map(hash_password).transpose()?;

    let result = sqlx::query(
        "UPDATE users SET \
            email = COALESCE($2, email), \
            full_name = COALESCE($3, full_name), \
            password = COALESCE($4, password), \
            phone_number = COALESCE($5, phone_number), \
            address = COALESCE($6, address), \
            is_active = COALESCE($7, is_active), \
            role_id = COALESCE($8, role_id), \
            updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&dto.email)
    .bind(&dto.full_name)
    .bind(&password_hash)
    .bind(&dto.phone_number)
    .bind(&dto.address)
    .bind(dto.is_active)
    .bind(dto.role_id)
    .execute(db)
    .await
    .map_err(|e| map_constraint_error(e, DUPLICATE_USER, UNKNOWN_ROLE))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("User not found")));
    }

    get_user(db, id).await
}

#[instrument(skip(db))]
pub async fn delete_user(db: &PgPool, id: i32) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("User not found")));
    }

    info!(user_id = id, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_bind_in_order() {
        let filters = UserFilterParams {
            search: Some("  jo ".to_string()),
            role_id: Some(2),
            is_active: Some(true),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM users u");
        push_filters(&mut qb, &filters);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM users u WHERE 1=1 AND (u.username ILIKE $1 OR u.email ILIKE $2 \
             OR u.full_name ILIKE $3) AND u.role_id = $4 AND u.is_active = $5"
        );
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filters = UserFilterParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM users u");
        push_filters(&mut qb, &filters);
        assert_eq!(qb.sql(), "SELECT 1 FROM users u WHERE 1=1");
    }
}
