//! # Warehouse CLI
//!
//! Administrative commands that talk to the database directly:
//!
//! - [`create_admin`]: create a user holding the seeded `ADMIN` role
//! - [`generate_month`]: build the inventory snapshots of one month
//! - [`check_access`]: explain the interceptor's decision for a request

use anyhow::{Context, anyhow, bail};
use sqlx::PgPool;
use validator::Validate;
use warehouse_auth::{Authorizer, Decision, RequestContext};
use warehouse_config::AccessConfig;
use warehouse_core::hash_password;
use warehouse_core::serde::parse_month;
use warehouse_models::CreateUserDto;

pub const ADMIN_ROLE: &str = "ADMIN";

pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
}

async fn role_id_by_name(pool: &PgPool, name: &str) -> anyhow::Result<Option<i32>> {
    let id = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Inserts an active user holding the `ADMIN` role and returns its id.
pub async fn create_admin(pool: &PgPool, admin: NewAdmin) -> anyhow::Result<i32> {
    let dto = CreateUserDto {
        username: admin.username,
        email: admin.email,
        full_name: admin.full_name,
        password: admin.password,
        phone_number: None,
        address: None,
        is_active: Some(true),
        role_id: None,
    };
    dto.validate().context("invalid admin details")?;

    let role_id = role_id_by_name(pool, ADMIN_ROLE)
        .await?
        .ok_or_else(|| anyhow!("{ADMIN_ROLE} role not found; run the migrations first"))?;

    let password_hash = hash_password(&dto.password).map_err(|e| e.error)?;

    let inserted = sqlx::query_scalar(
        "INSERT INTO users (username, email, full_name, password, is_active, role_id) \
         VALUES ($1, $2, $3, $4, TRUE, $5) RETURNING id",
    )
    .bind(&dto.username)
    .bind(&dto.email)
    .bind(&dto.full_name)
    .bind(&password_hash)
    .bind(role_id)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(id) => Ok(id),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            bail!("a user with username '{}' or email '{}' already exists", dto.username, dto.email)
        }
        Err(e) => Err(e.into()),
    }
}

/// Generates snapshots for a `YYYY-MM` month; returns the rows written.
pub async fn generate_month(pool: &PgPool, month: &str) -> anyhow::Result<u64> {
    let period = parse_month(month).ok_or_else(|| anyhow!("month must be formatted as YYYY-MM"))?;
    warehouse_db::generate_snapshots(pool, period).await
}

/// Runs the permission check for `method path` as `role` (a role name or id)
/// against a snapshot of the permission tables.
pub async fn check_access(
    pool: &PgPool,
    method: &str,
    path: &str,
    role: Option<&str>,
) -> anyhow::Result<Decision> {
    let role_id = match role {
        None => None,
        Some(raw) => match raw.parse::<i32>() {
            Ok(id) => Some(id),
            Err(_) => Some(
                role_id_by_name(pool, raw)
                    .await?
                    .ok_or_else(|| anyhow!("role '{raw}' not found"))?,
            ),
        },
    };

    let table = warehouse_db::load_permission_table(pool).await?;
    let authorizer = Authorizer::from_config(&AccessConfig::from_env());
    let ctx = RequestContext::new(method, path, role_id);

    Ok(authorizer.authorize(&table, &ctx).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_create_admin_assigns_admin_role(pool: PgPool) {
        let id = create_admin(
            &pool,
            NewAdmin {
                username: "root".to_string(),
                email: "root@example.com".to_string(),
                full_name: None,
                password: "password123".to_string(),
            },
        )
        .await
        .unwrap();

        let role: String = sqlx::query_scalar(
            "SELECT r.name FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1",
        )
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(role, ADMIN_ROLE);

        let decision = check_access(&pool, "DELETE", "/api/admin/users/5", Some(ADMIN_ROLE))
            .await
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_create_admin_rejects_short_password(pool: PgPool) {
        let result = create_admin(
            &pool,
            NewAdmin {
                username: "root".to_string(),
                email: "root@example.com".to_string(),
                full_name: None,
                password: "short".to_string(),
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_generate_month_rejects_bad_month(pool: PgPool) {
        assert!(generate_month(&pool, "2024/03").await.is_err());
    }
}
