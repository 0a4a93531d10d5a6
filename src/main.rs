use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use warehouse::logging::init_tracing;
use warehouse::metrics::{init_metrics, metrics_app};
use warehouse::router::init_router;
use warehouse::state::init_app_state;
use warehouse_config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing()?;

    let server_config = ServerConfig::from_env();
    let metrics_handle = init_metrics(server_config.metrics_enabled)?;

    let state = init_app_state(&server_config).await?;
    warehouse_db::run_migrations(&state.db)
        .await
        .context("failed to run database migrations")?;

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(%address, "server listening");
    info!("Swagger UI available at http://{address}/swagger-ui");
    info!("Scalar UI available at http://{address}/scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
