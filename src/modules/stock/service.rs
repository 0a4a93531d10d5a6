//! Stock-in and stock-out forms.
//!
//! Creating a form is one transaction: the touched product rows are locked
//! (`FOR UPDATE`, in code order), every line is checked, then the header,
//! the items and the quantity changes are written. Any failing line aborts
//! the whole form.

use std::collections::HashMap;

use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use warehouse_core::{AppError, PaginationMeta, PaginationParams};
use warehouse_models::{
    NewStockForm, PaginatedStockFormsResponse, StockDirection, StockForm, StockFormItem,
    StockFormWithItems,
};

use crate::metrics::track_stock_movement;
use crate::modules::map_constraint_error;

/// `(product_id, current quantity)` keyed by product code.
type LockedStock = HashMap<String, (i32, i32)>;

/// Turns merged `(code, quantity)` lines into `(product_id, signed delta)`
/// pairs, rejecting unknown products and movements that would leave a
/// quantity negative or overflow it.
fn plan_movements(
    direction: StockDirection,
    lines: &[(String, i32)],
    stock: &LockedStock,
) -> Result<Vec<(i32, i32)>, AppError> {
    lines
        .iter()
        .map(|(code, quantity)| {
            let (product_id, current) = stock
                .get(code)
                .copied()
                .ok_or_else(|| AppError::not_found(anyhow!("Product {code} not found")))?;

            let delta = direction.delta(*quantity);
            match current.checked_add(delta) {
                Some(next) if next >= 0 => Ok((product_id, delta)),
                Some(_) => Err(AppError::unprocessable(anyhow!(
                    "Insufficient stock for product {code}: available {current}, requested {quantity}"
                ))),
                None => Err(AppError::unprocessable(anyhow!(
                    "Quantity for product {code} is out of range"
                ))),
            }
        })
        .collect()
}

fn form_select(direction: StockDirection) -> String {
    format!(
        "SELECT id, code, note, {} AS date, created_by, created_at FROM {}",
        direction.date_column(),
        direction.form_table()
    )
}

async fn items_for_forms(
    db: &PgPool,
    direction: StockDirection,
    form_ids: &[i32],
) -> Result<HashMap<i32, Vec<StockFormItem>>, AppError> {
    let items: Vec<StockFormItem> = sqlx::query_as(&format!(
        "SELECT i.id, i.form_id, i.product_id, p.code AS product_code, p.name AS product_name, i.quantity \
         FROM {} i JOIN products p ON p.id = i.product_id \
         WHERE i.form_id = ANY($1) ORDER BY i.id",
        direction.item_table()
    ))
    .bind(form_ids)
    .fetch_all(db)
    .await?;

    let mut grouped: HashMap<i32, Vec<StockFormItem>> = HashMap::new();
    for item in items {
        grouped.entry(item.form_id).or_default().push(item);
    }
    Ok(grouped)
}

#[instrument(skip(db, form), fields(direction = form.direction.as_str(), code = %form.code))]
pub async fn create_form(
    db: &PgPool,
    form: NewStockForm,
    created_by: Option<i32>,
) -> Result<StockFormWithItems, AppError> {
    let direction = form.direction;
    let lines = form
        .merged_lines()
        .map_err(|e| AppError::unprocessable(anyhow!(e.to_string())))?;
    if lines.is_empty() {
        return Err(AppError::unprocessable(anyhow!("at least one product is required")));
    }

    let mut codes: Vec<&str> = lines.iter().map(|(code, _)| code.as_str()).collect();
    codes.sort_unstable();

    let mut tx = db.begin().await?;

    let locked: Vec<(i32, String, i32)> = sqlx::query_as(
        "SELECT id, code, quantity FROM products WHERE code = ANY($1) ORDER BY code FOR UPDATE",
    )
    .bind(&codes)
    .fetch_all(&mut *tx)
    .await?;

    let stock: LockedStock = locked
        .into_iter()
        .map(|(id, code, quantity)| (code, (id, quantity)))
        .collect();

    let movements = plan_movements(direction, &lines, &stock)?;

    let form_id: i32 = sqlx::query_scalar(&format!(
        "INSERT INTO {} (code, note, {}, created_by) VALUES ($1, $2, $3, $4) RETURNING id",
        direction.form_table(),
        direction.date_column()
    ))
    .bind(form.code.trim())
    .bind(&form.note)
    .bind(form.date)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_constraint_error(e, "A form with this code already exists", "Unknown user"))?;

    let item_sql = format!(
        "INSERT INTO {} (form_id, product_id, quantity) VALUES ($1, $2, $3)",
        direction.item_table()
    );
    for (product_id, delta) in &movements {
        sqlx::query(&item_sql)
            .bind(form_id)
            .bind(product_id)
            .bind(delta.abs())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE products SET quantity = quantity + $2, updated_at = NOW() WHERE id = $1")
            .bind(product_id)
            .bind(delta)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(form_id, lines = movements.len(), "stock form created");
    track_stock_movement(direction, movements.len());

    get_form(db, direction, form_id).await
}

#[instrument(skip(db))]
pub async fn get_form(
    db: &PgPool,
    direction: StockDirection,
    id: i32,
) -> Result<StockFormWithItems, AppError> {
    let form: StockForm = sqlx::query_as(&format!("{} WHERE id = $1", form_select(direction)))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Stock form not found")))?;

    let items = items_for_forms(db, direction, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default();

    Ok(StockFormWithItems { form, items })
}

/// Newest forms first.
#[instrument(skip(db))]
pub async fn list_forms(
    db: &PgPool,
    direction: StockDirection,
    pagination: PaginationParams,
) -> Result<PaginatedStockFormsResponse, AppError> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", direction.form_table()))
        .fetch_one(db)
        .await?;

    let forms: Vec<StockForm> = sqlx::query_as(&format!(
        "{} ORDER BY {} DESC, id DESC LIMIT $1 OFFSET $2",
        form_select(direction),
        direction.date_column()
    ))
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(db)
    .await?;

    let ids: Vec<i32> = forms.iter().map(|f| f.id).collect();
    let mut items = items_for_forms(db, direction, &ids).await?;

    let data: Vec<StockFormWithItems> = forms
        .into_iter()
        .map(|form| StockFormWithItems {
            items: items.remove(&form.id).unwrap_or_default(),
            form,
        })
        .collect();

    let meta = PaginationMeta::new(&pagination, total, data.len());
    Ok(PaginatedStockFormsResponse { data, meta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn stock() -> LockedStock {
        HashMap::from([
            ("SKU-1".to_string(), (1, 10)),
            ("SKU-2".to_string(), (2, 0)),
        ])
    }

    fn lines(items: &[(&str, i32)]) -> Vec<(String, i32)> {
        items.iter().map(|(c, q)| (c.to_string(), *q)).collect()
    }

    #[test]
    fn test_stock_in_adds() {
        let plan = plan_movements(StockDirection::In, &lines(&[("SKU-1", 5), ("SKU-2", 3)]), &stock())
            .unwrap();
        assert_eq!(plan, vec![(1, 5), (2, 3)]);
    }

    #[test]
    fn test_stock_out_may_empty_a_product() {
        let plan = plan_movements(StockDirection::Out, &lines(&[("SKU-1", 10)]), &stock()).unwrap();
        assert_eq!(plan, vec![(1, -10)]);
    }

    #[test]
    fn test_stock_out_beyond_available_is_rejected() {
        let err = plan_movements(
            StockDirection::Out,
            &lines(&[("SKU-1", 4), ("SKU-2", 1)]),
            &stock(),
        )
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.error.to_string().contains("SKU-2"));
    }

    #[test]
    fn test_unknown_product_is_not_found() {
        let err = plan_movements(StockDirection::In, &lines(&[("NOPE", 1)]), &stock()).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let stock = HashMap::from([("SKU-1".to_string(), (1, i32::MAX))]);
        let err = plan_movements(StockDirection::In, &lines(&[("SKU-1", 1)]), &stock).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_form_select_uses_direction_columns() {
        assert_eq!(
            form_select(StockDirection::Out),
            "SELECT id, code, note, date_out AS date, created_by, created_at FROM stock_out_forms"
        );
    }
}
