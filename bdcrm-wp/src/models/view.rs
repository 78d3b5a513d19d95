//! Hydrated read-path view types
//!
//! Shapes returned to callers of the hydration service. Derived values
//! (progress, timeline status, resolved dates) live only here; they are
//! never written back to the store.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::work_package::{Collateral, Item, Phase, TimelineStatus};

/// Item completion derived from approved collateral
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemProgress {
    /// Approved collateral count, capped at `total`
    pub completed: i64,
    /// Deliverable quantity
    pub total: i64,
    /// 0–100
    pub percentage: f64,
}

/// Item with collateral and derived progress attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub collateral: Vec<Collateral>,
    pub progress: ItemProgress,
    /// True when approved collateral covers the full quantity
    pub complete: bool,
}

/// Lightweight reference to the surfaced current phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRef {
    pub id: Uuid,
    pub name: String,
    pub position: i64,
}

/// Phase with items, resolved dates, and schedule health attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseView {
    #[serde(flatten)]
    pub phase: Phase,
    /// Start date the timeline math anchored on
    pub effective_date: Option<NaiveDate>,
    /// End date resolved via the fallback cascade
    pub expected_end_date: Option<NaiveDate>,
    pub timeline_status: TimelineStatus,
    pub items: Vec<ItemView>,
    /// Completed items / total items within this phase, 0.0–1.0
    pub progress: f64,
}

/// Full nested view of one work package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkPackageView {
    pub id: Uuid,
    pub name: String,
    pub effective_start_date: Option<NaiveDate>,
    pub phases: Vec<PhaseView>,
    /// First phase, in position order, that is not completed
    pub current_phase: Option<PhaseRef>,
    /// Completed items / total items across the package, 0.0–1.0
    pub progress: f64,
}
