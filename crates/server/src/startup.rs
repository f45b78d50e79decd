use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use service::UserService;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Apply pending migrations; safe to call on an up-to-date schema.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), StartupError> {
    migration::Migrator::up(db, None)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))
}

/// Router over an already-connected, migrated database.
pub fn build_app(db: DatabaseConnection, cfg: &AppConfig) -> Router {
    let state = AppState { users: UserService::new(db, cfg.users.clone()) };
    routes::build_router(state, build_cors())
}

/// Public entry: load config, connect, migrate, and serve until the listener fails.
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_default().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migrate(&db).await?;

    let app = build_app(db, &cfg);
    let addr = bind_addr(&cfg)?;
    info!(%addr, delete_strategy = ?cfg.users.delete_strategy, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(StartupError::from)?;
    axum::serve(listener, app).await?;
    Ok(())
}
