//! Stock-in and stock-out forms.
//!
//! Both directions share one row shape; the direction picks the tables and
//! the sign applied to product quantities.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};
use warehouse_core::PaginationMeta;
use warehouse_core::serde::form_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockDirection {
    In,
    Out,
}

impl StockDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            StockDirection::In => "in",
            StockDirection::Out => "out",
        }
    }

    pub fn form_table(self) -> &'static str {
        match self {
            StockDirection::In => "stock_in_forms",
            StockDirection::Out => "stock_out_forms",
        }
    }

    pub fn item_table(self) -> &'static str {
        match self {
            StockDirection::In => "stock_in_items",
            StockDirection::Out => "stock_out_items",
        }
    }

    pub fn date_column(self) -> &'static str {
        match self {
            StockDirection::In => "date_in",
            StockDirection::Out => "date_out",
        }
    }

    /// Signed change applied to a product's quantity for `quantity` units.
    pub fn delta(self, quantity: i32) -> i32 {
        match self {
            StockDirection::In => quantity,
            StockDirection::Out => -quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StockLineDto {
    #[serde(alias = "productCode")]
    #[validate(length(min = 1, max = 64, message = "product_code is required"))]
    pub product_code: String,
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStockInDto {
    #[validate(length(min = 1, max = 64, message = "code must be between 1 and 64 characters"))]
    pub code: String,
    pub note: Option<String>,
    #[serde(alias = "dateIn", with = "form_datetime")]
    #[schema(value_type = String, example = "2024-03-05 14:30:00")]
    pub date_in: NaiveDateTime,
    #[validate(length(min = 1, message = "at least one product is required"))]
    #[validate(nested)]
    pub products: Vec<StockLineDto>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStockOutDto {
    #[validate(length(min = 1, max = 64, message = "code must be between 1 and 64 characters"))]
    pub code: String,
    pub note: Option<String>,
    #[serde(alias = "dateOut", with = "form_datetime")]
    #[schema(value_type = String, example = "2024-03-05 14:30:00")]
    pub date_out: NaiveDateTime,
    #[validate(length(min = 1, message = "at least one product is required"))]
    #[validate(nested)]
    pub products: Vec<StockLineDto>,
}

/// Direction-independent form ready to be written.
#[derive(Debug, Clone)]
pub struct NewStockForm {
    pub direction: StockDirection,
    pub code: String,
    pub note: Option<String>,
    pub date: NaiveDateTime,
    pub lines: Vec<StockLineDto>,
}

impl From<CreateStockInDto> for NewStockForm {
    fn from(dto: CreateStockInDto) -> Self {
        NewStockForm {
            direction: StockDirection::In,
            code: dto.code,
            note: dto.note,
            date: dto.date_in,
            lines: dto.products,
        }
    }
}

impl From<CreateStockOutDto> for NewStockForm {
    fn from(dto: CreateStockOutDto) -> Self {
        NewStockForm {
            direction: StockDirection::Out,
            code: dto.code,
            note: dto.note,
            date: dto.date_out,
            lines: dto.products,
        }
    }
}

impl NewStockForm {
    /// Lines merged by product code, keeping first-seen order. Fails when a
    /// merged quantity no longer fits in an `i32`.
    pub fn merged_lines(&self) -> Result<Vec<(String, i32)>, ValidationError> {
        let mut merged: Vec<(String, i32)> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match merged.iter_mut().find(|(code, _)| *code == line.product_code) {
                Some((code, qty)) => {
                    *qty = qty.checked_add(line.quantity).ok_or_else(|| {
                        ValidationError::new("quantity").with_message(
                            format!("Quantity for product {code} is out of range").into(),
                        )
                    })?;
                }
                None => merged.push((line.product_code.clone(), line.quantity)),
            }
        }
        Ok(merged)
    }
}

/// Form header. `date` is `date_in` or `date_out` depending on direction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StockForm {
    pub id: i32,
    pub code: String,
    pub note: Option<String>,
    #[serde(with = "form_datetime")]
    #[schema(value_type = String, example = "2024-03-05 14:30:00")]
    pub date: NaiveDateTime,
    pub created_by: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StockFormItem {
    pub id: i32,
    pub form_id: i32,
    pub product_id: i32,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockFormWithItems {
    #[serde(flatten)]
    pub form: StockForm,
    pub items: Vec<StockFormItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStockFormsResponse {
    pub data: Vec<StockFormWithItems>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_in_parses_form_date() {
        let json = r#"{
            "code": "IN-001",
            "dateIn": "2024-03-05 14:30:00",
            "products": [{"productCode": "SKU-1", "quantity": 5}]
        }"#;
        let dto: CreateStockInDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.date_in.to_string(), "2024-03-05 14:30:00");
        assert_eq!(dto.products[0].product_code, "SKU-1");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_stock_out_rejects_iso_date() {
        let json = r#"{
            "code": "OUT-001",
            "date_out": "2024-03-05T14:30:00",
            "products": [{"product_code": "SKU-1", "quantity": 5}]
        }"#;
        assert!(serde_json::from_str::<CreateStockOutDto>(json).is_err());
    }

    #[test]
    fn test_empty_and_non_positive_lines_fail_validation() {
        let json = r#"{"code": "IN-002", "date_in": "2024-03-05 08:00:00", "products": []}"#;
        let dto: CreateStockInDto = serde_json::from_str(json).unwrap();
        assert!(dto.validate().is_err());

        let json = r#"{
            "code": "IN-003",
            "date_in": "2024-03-05 08:00:00",
            "products": [{"product_code": "SKU-1", "quantity": 0}]
        }"#;
        let dto: CreateStockInDto = serde_json::from_str(json).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_new_form_from_stock_out() {
        let json = r#"{
            "code": "OUT-002",
            "date_out": "2024-04-01 09:15:00",
            "products": [
                {"product_code": "SKU-1", "quantity": 2},
                {"product_code": "SKU-2", "quantity": 1},
                {"product_code": "SKU-1", "quantity": 3}
            ]
        }"#;
        let dto: CreateStockOutDto = serde_json::from_str(json).unwrap();
        let form = NewStockForm::from(dto);
        assert_eq!(form.direction, StockDirection::Out);
        assert_eq!(
            form.merged_lines().unwrap(),
            vec![("SKU-1".to_string(), 5), ("SKU-2".to_string(), 1)]
        );
    }

    #[test]
    fn test_merging_past_i32_max_is_rejected() {
        let json = r#"{
            "code": "IN-004",
            "date_in": "2024-03-05 08:00:00",
            "products": [
                {"product_code": "SKU-1", "quantity": 2000000000},
                {"product_code": "SKU-1", "quantity": 2000000000}
            ]
        }"#;
        let dto: CreateStockInDto = serde_json::from_str(json).unwrap();
        assert!(dto.validate().is_ok());

        let err = NewStockForm::from(dto).merged_lines().unwrap_err();
        assert!(err.to_string().contains("SKU-1"));
    }

    #[test]
    fn test_direction_tables_and_delta() {
        assert_eq!(StockDirection::In.form_table(), "stock_in_forms");
        assert_eq!(StockDirection::Out.item_table(), "stock_out_items");
        assert_eq!(StockDirection::Out.date_column(), "date_out");
        assert_eq!(StockDirection::In.delta(4), 4);
        assert_eq!(StockDirection::Out.delta(4), -4);
    }
}
