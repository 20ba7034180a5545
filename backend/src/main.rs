use std::sync::Arc;

use anyhow::Context;
use common::logger::init_logger;
use session::service::SessionService;
use session::store::sql_store::SqlSessionStore;
use sessions_backend::{
    config::AppConfig,
    db::Db,
    http::{AppState, router},
};
use tokio::net::TcpListener;

/// Connects the pool and optionally creates the tables, then wraps the pool
/// in the SQL-backed store.
async fn init_service(cfg: &AppConfig) -> anyhow::Result<SessionService> {
    let db = Db::connect(&cfg.database_url, cfg.db_max_connections).await?;

    if cfg.bootstrap_schema {
        tracing::warn!("BOOTSTRAP_SCHEMA set; creating missing tables");
        db.bootstrap().await.context("schema bootstrap failed")?;
    }

    let store = Arc::new(SqlSessionStore::new(db.pool));
    Ok(SessionService::new(store))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_logger("sessions-backend", cfg.json_logs);

    tracing::info!("Starting sessions backend...");

    let service = init_service(&cfg).await?;
    let app = router(AppState::new(service));

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
