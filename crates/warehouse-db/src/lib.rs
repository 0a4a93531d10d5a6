//! # Warehouse DB
//!
//! PostgreSQL pool initialisation, the embedded schema migrations and the
//! queries shared by the API server and the CLI.
//!
//! - [`access`]: [`PgAccessStore`], the permission interceptor's PostgreSQL backend
//! - [`inventory`]: monthly snapshot generation
//!
//! ```ignore
//! let pool = warehouse_db::init_db_pool(&database_url, 10).await?;
//! warehouse_db::run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub mod access;
pub mod inventory;

pub use access::{PgAccessStore, load_permission_table};
pub use inventory::generate_snapshots;
pub use sqlx::PgPool;

/// Reads `DATABASE_URL`.
pub fn database_url_from_env() -> Result<String, std::env::VarError> {
    std::env::var("DATABASE_URL")
}

/// Connects a pool to `database_url`.
///
/// The returned pool is cheaply cloneable; create it once at startup and
/// hand clones to the application state.
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    info!(max_connections, "database pool ready");
    Ok(pool)
}

/// Applies the migrations under `migrations/` at the workspace root.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
