use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use warehouse_core::{AppError, PaginationMeta, PaginationParams};
use warehouse_models::{
    CreateProductDto, PaginatedProductsResponse, Product, ProductFilterParams, UpdateProductDto,
};

use crate::modules::map_constraint_error;

const PRODUCT_COLUMNS: &str = "id, code, name, unit, description, quantity, created_at, updated_at";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ProductFilterParams) {
    qb.push(" WHERE 1=1");
    if let Some(search) = filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{search}%");
        qb.push(" AND (code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[instrument(skip(db))]
pub async fn list_products(
    db: &PgPool,
    filters: ProductFilterParams,
    pagination: PaginationParams,
) -> Result<PaginatedProductsResponse, AppError> {
    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_filters(&mut count_query, &filters);
    let total: i64 = count_query.build_query_scalar().fetch_one(db).await?;

    let mut query = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    push_filters(&mut query, &filters);
    query
        .push(" ORDER BY code LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());
    let products: Vec<Product> = query.build_query_as().fetch_all(db).await?;

    let meta = PaginationMeta::new(&pagination, total, products.len());
    Ok(PaginatedProductsResponse {
        data: products,
        meta,
    })
}

#[instrument(skip(db))]
pub async fn get_product(db: &PgPool, code: &str) -> Result<Product, AppError> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = $1"
    ))
    .bind(code)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Product {code} not found")))
}

#[instrument(skip(db, dto), fields(code = %dto.code))]
pub async fn create_product(db: &PgPool, dto: CreateProductDto) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products (code, name, unit, description) VALUES ($1, $2, $3, $4) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&dto.code)
    .bind(dto.name.trim())
    .bind(dto.unit.trim())
    .bind(&dto.description)
    .fetch_one(db)
    .await
    .map_err(|e| {
        map_constraint_error(e, "A product with this code already exists", "Invalid product")
    })?;

    info!(product_id = product.id, "product created");
    Ok(product)
}

#[instrument(skip(db, dto))]
pub async fn update_product(
    db: &PgPool,
    code: &str,
    dto: UpdateProductDto,
) -> Result<Product, AppError> {
    sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET \
            name = COALESCE($2, name), \
            unit = COALESCE($3, unit), \
            description = COALESCE($4, description), \
            updated_at = NOW() \
         WHERE code = $1 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(code)
    .bind(dto.name.as_deref().map(str::trim))
    .bind(dto.unit.as_deref().map(str::trim))
    .bind(&dto.description)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Product {code} not found")))
}

/// Products referenced by stock forms cannot be deleted.
#[instrument(skip(db))]
pub async fn delete_product(db: &PgPool, code: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM products WHERE code = $1")
        .bind(code)
        .execute(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::conflict(anyhow!("Product has stock movements and cannot be deleted"))
            }
            _ => AppError::database(e),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("Product {code} not found")));
    }

    info!(code, "product deleted");
    Ok(())
}
