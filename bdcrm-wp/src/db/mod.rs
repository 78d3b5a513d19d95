//! SQLite persistence for the work package engine
//!
//! Schema init plus the [`SqliteStore`] implementation of
//! [`WorkPackageStore`]. Table modules hold the per-record queries; this
//! module wires them to the trait.

pub mod collateral;
pub mod items;
pub mod phases;
pub mod work_packages;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;

use bdcrm_common::{Error, Result};

use crate::import::phase_grouper::PhaseDraft;
use crate::models::{Collateral, CollateralStatus, Item, Phase, WorkPackage, WorkStatus};
use crate::store::{ImportSummary, WorkPackageStore};

/// Initialize database connection pool
///
/// Connects with mode=rwc (read, write, create) and initializes the schema.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the engine's tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS work_packages (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            effective_start_date TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS phases (
            guid TEXT PRIMARY KEY,
            work_package_guid TEXT NOT NULL REFERENCES work_packages(guid),
            name TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 1,
            timeline_hint TEXT,
            estimated_start_date TEXT,
            estimated_end_date TEXT,
            actual_start_date TEXT,
            actual_end_date TEXT,
            status TEXT NOT NULL DEFAULT 'NOT_STARTED',
            total_duration_days REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (work_package_guid, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            guid TEXT PRIMARY KEY,
            phase_guid TEXT NOT NULL REFERENCES phases(guid),
            item_type TEXT NOT NULL,
            label TEXT NOT NULL,
            description TEXT,
            quantity INTEGER NOT NULL DEFAULT 1,
            unit_of_measure TEXT,
            estimated_hours_each REAL,
            duration_days REAL NOT NULL DEFAULT 1,
            status TEXT NOT NULL DEFAULT 'NOT_STARTED',
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collateral (
            guid TEXT PRIMARY KEY,
            item_guid TEXT NOT NULL REFERENCES items(guid),
            status TEXT NOT NULL DEFAULT 'DRAFT',
            label TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (work_packages, phases, items, collateral)");

    Ok(())
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl WorkPackageStore for SqliteStore {
    async fn create_work_package(&self, work_package: &WorkPackage) -> Result<()> {
        work_packages::insert_work_package(&self.pool, work_package).await
    }

    async fn fetch_work_package(&self, id: Uuid) -> Result<WorkPackage> {
        work_packages::fetch_work_package(&self.pool, id).await
    }

    async fn fetch_phases_with_items(
        &self,
        work_package_id: Uuid,
    ) -> Result<Vec<(Phase, Vec<Item>)>> {
        let phase_rows = phases::fetch_phases(&self.pool, work_package_id).await?;
        let mut result = Vec::with_capacity(phase_rows.len());
        for phase in phase_rows {
            let phase_items = items::fetch_items_by_phase(&self.pool, phase.id).await?;
            result.push((phase, phase_items));
        }
        Ok(result)
    }

    async fn fetch_phase(&self, phase_id: Uuid) -> Result<Phase> {
        phases::fetch_phase(&self.pool, phase_id).await
    }

    async fn fetch_item(&self, item_id: Uuid) -> Result<Item> {
        items::fetch_item(&self.pool, item_id).await
    }

    async fn fetch_items_by_phase(&self, phase_id: Uuid) -> Result<Vec<Item>> {
        items::fetch_items_by_phase(&self.pool, phase_id).await
    }

    async fn fetch_collateral(&self, collateral_id: Uuid) -> Result<Collateral> {
        collateral::fetch_collateral(&self.pool, collateral_id).await
    }

    async fn fetch_collateral_by_item_id(&self, item_id: Uuid) -> Result<Vec<Collateral>> {
        collateral::fetch_collateral_by_item_id(&self.pool, item_id).await
    }

    async fn upsert_phase(&self, phase: &Phase) -> Result<()> {
        phases::upsert_phase(&self.pool, phase).await
    }

    async fn upsert_item(&self, item: &Item) -> Result<()> {
        items::upsert_item(&self.pool, item).await
    }

    async fn delete_item(&self, item_id: Uuid) -> Result<()> {
        items::delete_item(&self.pool, item_id).await
    }

    async fn set_phase_total_duration(&self, phase_id: Uuid, total_days: f64) -> Result<()> {
        phases::set_phase_total_duration(&self.pool, phase_id, total_days).await
    }

    async fn upsert_collateral(&self, record: &Collateral) -> Result<()> {
        collateral::upsert_collateral(&self.pool, record).await
    }

    async fn commit_import(
        &self,
        work_package_id: Uuid,
        drafts: &[PhaseDraft],
    ) -> Result<ImportSummary> {
        phases::commit_import(&self.pool, work_package_id, drafts).await
    }
}

// Row-decoding helpers shared by the table modules.

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Malformed guid '{}': {}", value, e)))
}

pub(crate) fn parse_opt_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| Error::Internal(format!("Malformed date '{}': {}", s, e))),
    }
}

pub(crate) fn parse_work_status(value: &str) -> Result<WorkStatus> {
    WorkStatus::parse(value)
        .ok_or_else(|| Error::Internal(format!("Unknown work status '{}'", value)))
}

pub(crate) fn parse_collateral_status(value: &str) -> Result<CollateralStatus> {
    CollateralStatus::parse(value)
        .ok_or_else(|| Error::Internal(format!("Unknown collateral status '{}'", value)))
}
