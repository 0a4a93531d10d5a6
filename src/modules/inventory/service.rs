use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;
use warehouse_core::AppError;
use warehouse_models::{GenerateSnapshotsResponse, InventorySnapshot};

#[instrument(skip(db))]
pub async fn generate_snapshots(
    db: &PgPool,
    period: NaiveDate,
) -> Result<GenerateSnapshotsResponse, AppError> {
    let generated = warehouse_db::generate_snapshots(db, period)
        .await
        .map_err(AppError::internal)?;

    Ok(GenerateSnapshotsResponse {
        month: period.format("%Y-%m").to_string(),
        generated,
    })
}

#[instrument(skip(db))]
pub async fn list_snapshots(db: &PgPool, period: NaiveDate) -> Result<Vec<InventorySnapshot>, AppError> {
    let snapshots = sqlx::query_as::<_, InventorySnapshot>(
        "SELECT s.id, s.product_id, p.code AS product_code, p.name AS product_name, s.period, \
                s.opening_quantity, s.stock_in_quantity, s.stock_out_quantity, s.closing_quantity, \
                s.created_at \
         FROM inventory_snapshots s JOIN products p ON p.id = s.product_id \
         WHERE s.period = $1 ORDER BY p.code",
    )
    .bind(period)
    .fetch_all(db)
    .await?;

    Ok(snapshots)
}
