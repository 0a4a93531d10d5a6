//! PostgreSQL implementation of the permission interceptor's collaborators.

use async_trait::async_trait;
use sqlx::PgPool;
use warehouse_auth::{
    AccessError, PermissionLookup, PermissionRecord, PermissionTable, RoleMembership,
};
use warehouse_models::Permission;

const PERMISSION_COLUMNS: &str =
    "id, name, api_path, http_method, module, created_at, updated_at";

/// Reads `permissions` and `role_permissions` on every call.
#[derive(Debug, Clone)]
pub struct PgAccessStore {
    db: PgPool,
}

impl PgAccessStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PermissionLookup for PgAccessStore {
    async fn find_by_path(
        &self,
        api_path: &str,
        http_method: &str,
    ) -> Result<Option<PermissionRecord>, AccessError> {
        let sql = format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions \
             WHERE api_path = $1 AND http_method = $2 ORDER BY id LIMIT 1"
        );
        let permission = sqlx::query_as::<_, Permission>(&sql)
            .bind(api_path)
            .bind(http_method.to_ascii_uppercase())
            .fetch_optional(&self.db)
            .await
            .map_err(anyhow::Error::from)?;

        Ok(permission.map(Into::into))
    }

    async fn list_by_method(&self, http_method: &str) -> Result<Vec<PermissionRecord>, AccessError> {
        let sql = format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE http_method = $1 ORDER BY id"
        );
        let permissions = sqlx::query_as::<_, Permission>(&sql)
            .bind(http_method.to_ascii_uppercase())
            .fetch_all(&self.db)
            .await
            .map_err(anyhow::Error::from)?;

        Ok(permissions.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl RoleMembership for PgAccessStore {
    async fn role_has_permission(&self, role_id: i32, permission_id: i32) -> Result<bool, AccessError> {
        let linked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM role_permissions WHERE role_id = $1 AND permission_id = $2)",
        )
        .bind(role_id)
        .bind(permission_id)
        .fetch_one(&self.db)
        .await
        .map_err(anyhow::Error::from)?;

        Ok(linked)
    }
}

/// Copies the whole permission/grant graph into an in-memory table.
pub async fn load_permission_table(db: &PgPool) -> Result<PermissionTable, sqlx::Error> {
    let sql = format!("SELECT {PERMISSION_COLUMNS} FROM permissions ORDER BY id");
    let permissions = sqlx::query_as::<_, Permission>(&sql).fetch_all(db).await?;

    let grants: Vec<(i32, i32)> =
        sqlx::query_as("SELECT role_id, permission_id FROM role_permissions")
            .fetch_all(db)
            .await?;

    Ok(PermissionTable::from_parts(
        permissions.into_iter().map(PermissionRecord::from),
        grants,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_auth::{Authorizer, Decision, DenyReason, RequestContext};

    async fn role_id(db: &PgPool, name: &str) -> i32 {
        sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_seeded_staff_can_read_products_but_not_users(db: PgPool) {
        let store = PgAccessStore::new(db.clone());
        let authorizer = Authorizer::default();
        let staff = role_id(&db, "STAFF").await;

        let ctx = RequestContext::new("GET", "/api/products/SKU-001", Some(staff));
        assert!(authorizer.authorize(&store, &ctx).await.unwrap().is_allowed());

        let ctx = RequestContext::new("GET", "/api/admin/users/42", Some(staff));
        assert_eq!(
            authorizer.authorize(&store, &ctx).await.unwrap(),
            Decision::Deny(DenyReason::RoleLacksPermission)
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_snapshot_table_matches_live_store(db: PgPool) {
        let store = PgAccessStore::new(db.clone());
        let table = load_permission_table(&db).await.unwrap();
        let authorizer = Authorizer::default();
        let admin = role_id(&db, "ADMIN").await;

        for (method, path) in [
            ("PUT", "/api/admin/roles/3/permissions"),
            ("DELETE", "/api/products/SKU-9"),
            ("GET", "/api/unknown"),
        ] {
            let ctx = RequestContext::new(method, path, Some(admin));
            assert_eq!(
                authorizer.authorize(&store, &ctx).await.unwrap(),
                authorizer.authorize(&table, &ctx).await.unwrap(),
            );
        }
    }
}
