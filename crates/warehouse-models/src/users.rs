//! User accounts.
//!
//! Each user holds at most one role; the role decides which endpoints the
//! permission interceptor lets through.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;
use warehouse_core::PaginationMeta;

/// A user as returned by the API (never includes the password hash).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub role_id: Option<i32>,
    /// Name of `role_id`, joined from `roles`
    pub role_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 3, max = 50, message = "username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 150, message = "full_name must not exceed 150 characters"))]
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(max = 30, message = "phone_number must not exceed 30 characters"))]
    #[serde(alias = "phoneNumber")]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "isActive", alias = "is_active")]
    pub is_active: Option<bool>,
    #[serde(alias = "roleId")]
    pub role_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "full_name must not exceed 150 characters"))]
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    #[validate(length(max = 30, message = "phone_number must not exceed 30 characters"))]
    #[serde(alias = "phoneNumber")]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "isActive", alias = "is_active")]
    pub is_active: Option<bool>,
    #[serde(alias = "roleId")]
    pub role_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserFilterParams {
    /// Matches username, email or full name
    pub search: Option<String>,
    pub role_id: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_accepts_camel_case_fields() {
        let json = r#"{
            "username": "jdoe",
            "email": "jdoe@example.com",
            "fullName": "John Doe",
            "password": "password123",
            "phoneNumber": "+84 123",
            "isActive": false,
            "roleId": 2
        }"#;
        let dto: CreateUserDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.full_name.as_deref(), Some("John Doe"));
        assert_eq!(dto.is_active, Some(false));
        assert_eq!(dto.role_id, Some(2));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_user_validation() {
        let dto = CreateUserDto {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            full_name: None,
            password: "short".to_string(),
            phone_number: None,
            address: None,
            is_active: None,
            role_id: None,
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_user_serializes_is_active_in_camel_case() {
        let now = chrono::Utc::now();
        let user = User {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            full_name: None,
            phone_number: None,
            address: None,
            is_active: true,
            role_id: Some(1),
            role_name: Some("ADMIN".to_string()),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["isActive"], true);
        assert!(json.get("password").is_none());
    }
}
