pub mod auth;
pub mod inventory;
pub mod permissions;
pub mod products;
pub mod roles;
pub mod stock;
pub mod users;

use anyhow::anyhow;
use warehouse_core::AppError;

/// Maps unique and foreign-key violations to client errors; everything else
/// stays a 500.
pub(crate) fn map_constraint_error(
    err: sqlx::Error,
    on_unique: &'static str,
    on_foreign_key: &'static str,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow!(on_unique));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::unprocessable(anyhow!(on_foreign_key));
        }
    }
    AppError::database(err)
}
