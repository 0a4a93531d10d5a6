//! Permission records.
//!
//! A permission grants one `(http_method, api_path)` endpoint. `api_path` may
//! name dynamic segments with `{...}` placeholders, e.g.
//! `/api/admin/users/{id}`; the permission interceptor maps concrete request
//! paths onto these patterns.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};
use warehouse_auth::PermissionRecord;
use warehouse_core::PaginationMeta;

pub const HTTP_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Permission {
    pub id: i32,
    pub name: String,
    /// Path pattern, e.g. `/api/products/{productCode}`
    pub api_path: String,
    pub http_method: String,
    pub module: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Permission> for PermissionRecord {
    fn from(p: Permission) -> Self {
        PermissionRecord {
            id: p.id,
            name: p.name,
            api_path: p.api_path,
            http_method: p.http_method,
            module: p.module,
        }
    }
}

pub fn validate_api_path(api_path: &str) -> Result<(), ValidationError> {
    let well_formed = api_path.starts_with('/')
        && !api_path.contains(char::is_whitespace)
        && !api_path.contains('?')
        && (api_path == "/" || !api_path.ends_with('/'));

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("api_path")
            .with_message("api_path must start with '/' and contain no spaces, query or trailing slash".into()))
    }
}

pub fn validate_http_method(method: &str) -> Result<(), ValidationError> {
    if HTTP_METHODS.contains(&method.to_ascii_uppercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("http_method")
            .with_message("http_method must be one of GET, POST, PUT, PATCH, DELETE".into()))
    }
}

fn validate_api_path_field(api_path: &String) -> Result<(), ValidationError> {
    validate_api_path(api_path)
}

fn validate_http_method_field(method: &String) -> Result<(), ValidationError> {
    validate_http_method(method)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionDto {
    #[validate(length(min = 1, max = 150, message = "name must be between 1 and 150 characters"))]
    pub name: String,
    #[validate(
        length(max = 255, message = "api_path must not exceed 255 characters"),
        custom(function = "validate_api_path_field")
    )]
    #[schema(example = "/api/products/{productCode}")]
    pub api_path: String,
    #[validate(custom(function = "validate_http_method_field"))]
    #[schema(example = "GET")]
    pub http_method: String,
    #[validate(length(min = 1, max = 100, message = "module must be between 1 and 100 characters"))]
    pub module: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePermissionDto {
    #[validate(length(min = 1, max = 150, message = "name must be between 1 and 150 characters"))]
    pub name: Option<String>,
    #[validate(
        length(max = 255, message = "api_path must not exceed 255 characters"),
        custom(function = "validate_api_path_field")
    )]
    pub api_path: Option<String>,
    #[validate(custom(function = "validate_http_method_field"))]
    pub http_method: Option<String>,
    #[validate(length(min = 1, max = 100, message = "module must be between 1 and 100 characters"))]
    pub module: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PermissionFilterParams {
    pub module: Option<String>,
    pub http_method: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedPermissionsResponse {
    pub data: Vec<Permission>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(api_path: &str, http_method: &str) -> CreatePermissionDto {
        CreatePermissionDto {
            name: "View product".to_string(),
            api_path: api_path.to_string(),
            http_method: http_method.to_string(),
            module: "products".to_string(),
        }
    }

    #[test]
    fn test_valid_permission() {
        assert!(dto("/api/products/{productCode}", "GET").validate().is_ok());
        assert!(dto("/api/products", "delete").validate().is_ok());
    }

    #[test]
    fn test_api_path_rules() {
        assert!(dto("api/products", "GET").validate().is_err());
        assert!(dto("/api/products/", "GET").validate().is_err());
        assert!(dto("/api/products?x=1", "GET").validate().is_err());
        assert!(dto("/api/pro ducts", "GET").validate().is_err());
    }

    #[test]
    fn test_http_method_rules() {
        assert!(dto("/api/products", "FETCH").validate().is_err());
        assert!(dto("/api/products", "").validate().is_err());
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        let update = UpdatePermissionDto {
            name: None,
            api_path: None,
            http_method: Some("put".to_string()),
            module: None,
        };
        assert!(update.validate().is_ok());

        let update = UpdatePermissionDto {
            name: None,
            api_path: Some("relative".to_string()),
            http_method: None,
            module: None,
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_into_permission_record() {
        let now = chrono::Utc::now();
        let record: PermissionRecord = Permission {
            id: 3,
            name: "View user".to_string(),
            api_path: "/api/admin/users/{id}".to_string(),
            http_method: "GET".to_string(),
            module: "users".to_string(),
            created_at: now,
            updated_at: now,
        }
        .into();
        assert_eq!(record.id, 3);
        assert_eq!(record.api_path, "/api/admin/users/{id}");
    }
}
