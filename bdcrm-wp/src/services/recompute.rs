//! Item write path with incremental phase-total recompute
//!
//! Every item mutation persists the item first, then rereads the phase's
//! full item set and persists the recomputed total. A recompute failure
//! after a successful item write is a data-quality issue, not a request
//! failure: the stale total is logged and the mutation still succeeds.
//! Phase status changes also live here, guarded to forward transitions.

use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use bdcrm_common::{Error, Result};

use crate::models::{Item, Phase, WorkStatus};
use crate::store::WorkPackageStore;
use crate::timeline::duration::calculate_phase_total_duration;

/// Create an item under a phase and refresh the phase total
///
/// The item is appended after the phase's current tail regardless of the
/// sort_order it arrived with.
pub async fn create_item(
    store: &dyn WorkPackageStore,
    phase_id: Uuid,
    mut item: Item,
) -> Result<Item> {
    // Reject writes against a phase that does not exist
    let _ = store.fetch_phase(phase_id).await?;

    let tail = store
        .fetch_items_by_phase(phase_id)
        .await?
        .iter()
        .map(|existing| existing.sort_order)
        .max()
        .unwrap_or(-1);

    item.phase_id = phase_id;
    item.sort_order = tail + 1;

    store.upsert_item(&item).await?;
    recompute_phase_total(store, phase_id).await;

    Ok(item)
}

/// Persist an updated item and refresh the phase total
pub async fn update_item(store: &dyn WorkPackageStore, item: &Item) -> Result<()> {
    store.upsert_item(item).await?;
    recompute_phase_total(store, item.phase_id).await;
    Ok(())
}

/// Delete an item and refresh the phase total
pub async fn delete_item(store: &dyn WorkPackageStore, item_id: Uuid) -> Result<()> {
    let item = store.fetch_item(item_id).await?;
    store.delete_item(item_id).await?;
    recompute_phase_total(store, item.phase_id).await;
    Ok(())
}

/// Reread the phase's items and persist the recomputed total
///
/// Failures are logged, never propagated: the triggering item write has
/// already committed and must not be rolled back by a downstream aggregate.
async fn recompute_phase_total(store: &dyn WorkPackageStore, phase_id: Uuid) {
    if let Err(error) = try_recompute(store, phase_id).await {
        warn!(
            phase_id = %phase_id,
            error = %error,
            "Phase total recompute failed; stored aggregate is stale until the next item write"
        );
    }
}

async fn try_recompute(store: &dyn WorkPackageStore, phase_id: Uuid) -> Result<()> {
    let items = store.fetch_items_by_phase(phase_id).await?;
    let total = calculate_phase_total_duration(&items);
    store.set_phase_total_duration(phase_id, total).await
}

/// Move a phase's status forward
///
/// Status is user-driven and monotonic: regressions are rejected, and the
/// engine fills in actual dates the first time a boundary is crossed.
pub async fn advance_phase_status(
    store: &dyn WorkPackageStore,
    phase_id: Uuid,
    new_status: WorkStatus,
    today: NaiveDate,
) -> Result<Phase> {
    let mut phase = store.fetch_phase(phase_id).await?;

    if !phase.status.is_forward_transition(new_status) {
        return Err(Error::InvalidInput(format!(
            "phase status cannot move from {} back to {}",
            phase.status.as_str(),
            new_status.as_str()
        )));
    }

    if new_status != WorkStatus::NotStarted && phase.actual_start_date.is_none() {
        phase.actual_start_date = Some(today);
    }
    if new_status == WorkStatus::Completed && phase.actual_end_date.is_none() {
        phase.actual_end_date = Some(today);
    }
    phase.status = new_status;

    store.upsert_phase(&phase).await?;
    Ok(phase)
}

/// Patch of the schedule fields a caller may edit on a phase
#[derive(Debug, Clone, Default)]
pub struct PhaseSchedulePatch {
    pub timeline_hint: Option<Option<String>>,
    pub estimated_start_date: Option<Option<NaiveDate>>,
    pub estimated_end_date: Option<Option<NaiveDate>>,
    pub actual_start_date: Option<Option<NaiveDate>>,
    pub actual_end_date: Option<Option<NaiveDate>>,
}

/// Apply schedule-field edits to a phase
///
/// Name, position, status, and the derived total are not editable here:
/// the first two belong to import, the rest to their own write paths.
pub async fn update_phase_schedule(
    store: &dyn WorkPackageStore,
    phase_id: Uuid,
    patch: PhaseSchedulePatch,
) -> Result<Phase> {
    let mut phase = store.fetch_phase(phase_id).await?;

    if let Some(hint) = patch.timeline_hint {
        phase.timeline_hint = hint;
    }
    if let Some(date) = patch.estimated_start_date {
        phase.estimated_start_date = date;
    }
    if let Some(date) = patch.estimated_end_date {
        phase.estimated_end_date = date;
    }
    if let Some(date) = patch.actual_start_date {
        phase.actual_start_date = date;
    }
    if let Some(date) = patch.actual_end_date {
        phase.actual_end_date = date;
    }

    store.upsert_phase(&phase).await?;
    Ok(phase)
}
