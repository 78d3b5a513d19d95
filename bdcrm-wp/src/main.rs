//! bdcrm-wp - Work Package Progress & Timeline Engine
//!
//! Serves the import pipeline (validate → preview → commit), the hydrated
//! work package view, and the item/phase/collateral mutation endpoints to
//! the rest of the BDCRM system.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bdcrm_common::config::{ConfigResolver, ServiceConfig};
use bdcrm_wp::{build_router, db, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting bdcrm-wp (Work Package Engine) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration (ENV → TOML → defaults)
    let config = ConfigResolver::new("wp").resolve(ServiceConfig {
        database_path: PathBuf::from("bdcrm-wp.db"),
        bind_address: "127.0.0.1:5741".to_string(),
    })?;
    info!("Database: {}", config.database_path.display());

    // Initialize database connection pool and schema
    let pool = db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Create application state and router
    let state = AppState::new(db::SqliteStore::new(pool));
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
