//! bdcrm-wp library interface
//!
//! Work Package Progress & Timeline Engine: turns raw deliverable rows into
//! an ordered Phase → Item → Collateral hierarchy and derives progress,
//! durations, and schedule health from it. The axum surface is thin; the
//! engine itself is plain functions over the [`store::WorkPackageStore`]
//! seam so it stays unit-testable without a database.

pub mod api;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod services;
pub mod store;
pub mod timeline;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// SQLite-backed store
    pub store: Arc<db::SqliteStore>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: db::SqliteStore) -> Self {
        Self {
            store: Arc::new(store),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    api::routes().with_state(state)
}
