//! Monthly inventory snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;
use warehouse_core::serde::{deserialize_month, serialize_month};

/// Balance of one product over one month.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventorySnapshot {
    pub id: i32,
    pub product_id: i32,
    pub product_code: String,
    pub product_name: String,
    #[serde(serialize_with = "serialize_month", deserialize_with = "deserialize_month")]
    #[schema(value_type = String, example = "2024-03")]
    pub period: NaiveDate,
    pub opening_quantity: i32,
    pub stock_in_quantity: i32,
    pub stock_out_quantity: i32,
    pub closing_quantity: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Opening/closing figures for a month, reconstructed backwards from the
/// product's current quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotBalance {
    pub opening: i64,
    pub stock_in: i64,
    pub stock_out: i64,
    pub closing: i64,
}

impl SnapshotBalance {
    /// `in_month`/`out_month` are movements dated inside the month,
    /// `in_after`/`out_after` those dated on or after the next month's start.
    pub fn derive(current: i64, in_month: i64, out_month: i64, in_after: i64, out_after: i64) -> Self {
        let closing = current - in_after + out_after;
        let opening = closing - in_month + out_month;
        SnapshotBalance {
            opening,
            stock_in: in_month,
            stock_out: out_month,
            closing,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GenerateSnapshotsDto {
    #[serde(deserialize_with = "deserialize_month")]
    #[schema(value_type = String, example = "2024-03")]
    pub month: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SnapshotQuery {
    #[serde(deserialize_with = "deserialize_month")]
    #[schema(value_type = String, example = "2024-03")]
    pub month: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateSnapshotsResponse {
    #[schema(example = "2024-03")]
    pub month: String,
    /// Number of product rows written
    pub generated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_without_later_movements() {
        let balance = SnapshotBalance::derive(30, 20, 5, 0, 0);
        assert_eq!(balance.closing, 30);
        assert_eq!(balance.opening, 15);
    }

    #[test]
    fn test_balance_unwinds_later_movements() {
        // 10 at start of March, +20 in, -5 out during March, then +7 and -2 in April.
        let current = 10 + 20 - 5 + 7 - 2;
        let balance = SnapshotBalance::derive(current, 20, 5, 7, 2);
        assert_eq!(balance.opening, 10);
        assert_eq!(balance.closing, 25);
        assert_eq!(balance.stock_in, 20);
        assert_eq!(balance.stock_out, 5);
    }

    #[test]
    fn test_generate_dto_parses_month() {
        let dto: GenerateSnapshotsDto = serde_json::from_str(r#"{"month":"2024-03"}"#).unwrap();
        assert_eq!(dto.month, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(serde_json::from_str::<GenerateSnapshotsDto>(r#"{"month":"2024-13"}"#).is_err());
        assert!(serde_json::from_str::<GenerateSnapshotsDto>(r#"{"month":"March"}"#).is_err());
    }
}
