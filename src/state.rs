use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use warehouse_auth::{AccessStore, Authorizer};
use warehouse_config::{AccessConfig, CorsConfig, JwtConfig, ServerConfig};
use warehouse_db::{PgAccessStore, database_url_from_env, init_db_pool};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub authorizer: Arc<Authorizer>,
    /// Permission data read by the interceptor; PostgreSQL unless replaced.
    pub access_store: Arc<dyn AccessStore>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        access_config: &AccessConfig,
    ) -> Self {
        Self {
            access_store: Arc::new(PgAccessStore::new(db.clone())),
            authorizer: Arc::new(Authorizer::from_config(access_config)),
            db,
            jwt_config,
            cors_config,
        }
    }

    pub fn with_access_store(mut self, store: Arc<dyn AccessStore>) -> Self {
        self.access_store = store;
        self
    }
}

pub async fn init_app_state(server_config: &ServerConfig) -> anyhow::Result<AppState> {
    let database_url = database_url_from_env().context("DATABASE_URL must be set")?;
    let db = init_db_pool(&database_url, server_config.database_max_connections)
        .await
        .context("failed to connect to database")?;

    Ok(AppState::new(
        db,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        &AccessConfig::from_env(),
    ))
}
