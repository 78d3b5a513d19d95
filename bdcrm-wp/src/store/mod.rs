//! Persistence interface required of the backing store
//!
//! Technology-agnostic seam between the engine and whatever actually holds
//! Phase, Item, and Collateral records. Every method is atomic per call;
//! `commit_import` is additionally all-or-nothing across its whole batch.
//! The SQLite implementation lives in [`crate::db`].

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use bdcrm_common::Result;

use crate::import::phase_grouper::PhaseDraft;
use crate::models::{Collateral, Item, Phase, WorkPackage};

/// Row counts from a committed bulk import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub phases: usize,
    pub items: usize,
}

#[async_trait]
pub trait WorkPackageStore: Send + Sync {
    async fn create_work_package(&self, work_package: &WorkPackage) -> Result<()>;

    async fn fetch_work_package(&self, id: Uuid) -> Result<WorkPackage>;

    /// Phases of a package with their items, ordered by position then
    /// insertion, items in sort order
    async fn fetch_phases_with_items(&self, work_package_id: Uuid)
        -> Result<Vec<(Phase, Vec<Item>)>>;

    async fn fetch_phase(&self, phase_id: Uuid) -> Result<Phase>;

    async fn fetch_item(&self, item_id: Uuid) -> Result<Item>;

    async fn fetch_items_by_phase(&self, phase_id: Uuid) -> Result<Vec<Item>>;

    async fn fetch_collateral(&self, collateral_id: Uuid) -> Result<Collateral>;

    async fn fetch_collateral_by_item_id(&self, item_id: Uuid) -> Result<Vec<Collateral>>;

    async fn upsert_phase(&self, phase: &Phase) -> Result<()>;

    async fn upsert_item(&self, item: &Item) -> Result<()>;

    async fn delete_item(&self, item_id: Uuid) -> Result<()>;

    /// Persist the derived phase aggregate; the only writer of this column
    /// outside `commit_import`
    async fn set_phase_total_duration(&self, phase_id: Uuid, total_days: f64) -> Result<()>;

    async fn upsert_collateral(&self, collateral: &Collateral) -> Result<()>;

    /// Commit reviewed phase drafts in one transaction
    ///
    /// Existing phases (matched per package by exact name) keep their status
    /// and dates; position takes the max of stored and incoming, the
    /// timeline hint stays first-wins, and incoming items append after the
    /// phase's current tail. Phase totals are recomputed inside the same
    /// transaction.
    async fn commit_import(
        &self,
        work_package_id: Uuid,
        phases: &[PhaseDraft],
    ) -> Result<ImportSummary>;
}
