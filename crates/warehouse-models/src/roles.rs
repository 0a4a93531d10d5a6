//! Roles and their permission sets.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::permissions::Permission;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    /// Permission IDs granted to the new role
    pub permission_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleDto {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
}

/// Replaces the whole permission set of a role.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetRolePermissionsDto {
    pub permission_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role_dto_validation() {
        let valid = CreateRoleDto {
            name: "AUDITOR".to_string(),
            description: Some("Read-only inventory access".to_string()),
            permission_ids: Some(vec![1, 2]),
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateRoleDto {
            name: String::new(),
            description: None,
            permission_ids: None,
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_update_role_description_limit() {
        let update = UpdateRoleDto {
            name: None,
            description: Some("x".repeat(501)),
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_role_with_permissions_flattens_role() {
        let now = chrono::Utc::now();
        let role = RoleWithPermissions {
            role: Role {
                id: 2,
                name: "STAFF".to_string(),
                description: None,
                created_at: now,
                updated_at: now,
            },
            permissions: vec![],
        };
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["name"], "STAFF");
        assert!(json["permissions"].as_array().unwrap().is_empty());
    }
}
