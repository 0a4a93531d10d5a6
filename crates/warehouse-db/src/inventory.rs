//! Monthly inventory snapshot generation.
//!
//! A snapshot is reconstructed backwards from each product's current
//! quantity: movements dated after the month are unwound to get the closing
//! balance, then the month's own movements are unwound to get the opening
//! balance. Regenerating a month overwrites its rows.

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};
use warehouse_models::SnapshotBalance;

#[derive(Debug, FromRow)]
struct ProductMovements {
    product_id: i32,
    current: i64,
    in_month: i64,
    out_month: i64,
    in_after: i64,
    out_after: i64,
}

const MOVEMENTS_SQL: &str = r#"
SELECT
    p.id AS product_id,
    p.quantity::BIGINT AS current,
    COALESCE((SELECT SUM(i.quantity) FROM stock_in_items i
              JOIN stock_in_forms f ON f.id = i.form_id
              WHERE i.product_id = p.id AND f.date_in >= $1 AND f.date_in < $2), 0)::BIGINT AS in_month,
    COALESCE((SELECT SUM(i.quantity) FROM stock_out_items i
              JOIN stock_out_forms f ON f.id = i.form_id
              WHERE i.product_id = p.id AND f.date_out >= $1 AND f.date_out < $2), 0)::BIGINT AS out_month,
    COALESCE((SELECT SUM(i.quantity) FROM stock_in_items i
              JOIN stock_in_forms f ON f.id = i.form_id
              WHERE i.product_id = p.id AND f.date_in >= $2), 0)::BIGINT AS in_after,
    COALESCE((SELECT SUM(i.quantity) FROM stock_out_items i
              JOIN stock_out_forms f ON f.id = i.form_id
              WHERE i.product_id = p.id AND f.date_out >= $2), 0)::BIGINT AS out_after
FROM products p
ORDER BY p.id
"#;

const UPSERT_SQL: &str = r#"
INSERT INTO inventory_snapshots
    (product_id, period, opening_quantity, stock_in_quantity, stock_out_quantity, closing_quantity)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (product_id, period) DO UPDATE SET
    opening_quantity = EXCLUDED.opening_quantity,
    stock_in_quantity = EXCLUDED.stock_in_quantity,
    stock_out_quantity = EXCLUDED.stock_out_quantity,
    closing_quantity = EXCLUDED.closing_quantity,
    created_at = NOW()
"#;

fn to_column(value: i64, column: &str) -> anyhow::Result<i32> {
    i32::try_from(value).with_context(|| format!("{column} {value} does not fit in INTEGER"))
}

/// Writes one snapshot row per product for the month starting at `period`
/// and returns the number of rows written.
///
/// `period` must be the first day of a month.
#[instrument(skip(db))]
pub async fn generate_snapshots(db: &PgPool, period: NaiveDate) -> anyhow::Result<u64> {
    let next = period
        .checked_add_months(chrono::Months::new(1))
        .context("period is out of range")?;
    let start = NaiveDateTime::new(period, NaiveTime::MIN);
    let end = NaiveDateTime::new(next, NaiveTime::MIN);

    let mut tx = db.begin().await?;

    let movements = sqlx::query_as::<_, ProductMovements>(MOVEMENTS_SQL)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *tx)
        .await?;

    let mut written = 0;
    for row in &movements {
        let balance = SnapshotBalance::derive(
            row.current,
            row.in_month,
            row.out_month,
            row.in_after,
            row.out_after,
        );

        written += sqlx::query(UPSERT_SQL)
            .bind(row.product_id)
            .bind(period)
            .bind(to_column(balance.opening, "opening_quantity")?)
            .bind(to_column(balance.stock_in, "stock_in_quantity")?)
            .bind(to_column(balance.stock_out, "stock_out_quantity")?)
            .bind(to_column(balance.closing, "closing_quantity")?)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;

    info!(%period, products = movements.len(), "inventory snapshots generated");
    Ok(written)
}
