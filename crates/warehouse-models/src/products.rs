//! The product catalogue.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};
use warehouse_core::PaginationMeta;

/// A stocked product, addressed in URLs by its `code`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub description: Option<String>,
    /// Current on-hand quantity, maintained by stock forms only
    pub quantity: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Product codes travel as URL segments, so they are limited to
/// `[A-Za-z0-9_-]` and must contain at least one letter.
pub fn validate_product_code(code: &str) -> Result<(), ValidationError> {
    let charset_ok = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let has_letter = code.chars().any(|c| c.is_ascii_alphabetic());

    if charset_ok && has_letter {
        Ok(())
    } else {
        Err(ValidationError::new("code").with_message(
            "code may only contain letters, digits, '-' and '_' and must include a letter".into(),
        ))
    }
}

fn validate_product_code_field(code: &String) -> Result<(), ValidationError> {
    validate_product_code(code)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductDto {
    #[validate(
        length(min = 1, max = 64, message = "code must be between 1 and 64 characters"),
        custom(function = "validate_product_code_field")
    )]
    #[schema(example = "SKU-0001")]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 30, message = "unit must be between 1 and 30 characters"))]
    #[schema(example = "box")]
    pub unit: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductDto {
    #[validate(length(min = 1, max = 200, message = "name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 30, message = "unit must be between 1 and 30 characters"))]
    pub unit: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductFilterParams {
    /// Matches code or name
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedProductsResponse {
    pub data: Vec<Product>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(code: &str) -> CreateProductDto {
        CreateProductDto {
            code: code.to_string(),
            name: "Cardboard box".to_string(),
            unit: "box".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_product_code_rules() {
        assert!(dto("SKU-0001").validate().is_ok());
        assert!(dto("abc_123").validate().is_ok());
        assert!(dto("").validate().is_err());
        assert!(dto("12345").validate().is_err());
        assert!(dto("SKU 1").validate().is_err());
        assert!(dto("SKU/1").validate().is_err());
        assert!(dto(&"A".repeat(65)).validate().is_err());
    }

    #[test]
    fn test_update_product_allows_partial() {
        let update = UpdateProductDto {
            name: Some("Pallet".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let update = UpdateProductDto {
            unit: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
