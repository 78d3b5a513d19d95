//! Read-path hydration
//!
//! Assembles the full nested work package view: collateral-derived item
//! progress, resolved phase dates, schedule health, and the single current
//! phase. Strictly read-only; derived values are returned to the caller and
//! never written back to the store.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use bdcrm_common::Result;

use crate::models::{
    CollateralStatus, Item, ItemProgress, ItemView, PhaseRef, PhaseView, WorkPackageView,
    WorkStatus,
};
use crate::store::WorkPackageStore;
use crate::timeline::status::{classify, resolve_expected_end, DEFAULT_RISK_WINDOW_DAYS};

/// Build the full nested view of one work package
///
/// `now` is injected by the caller (taken once at the request edge) so the
/// whole read path stays referentially transparent.
pub async fn hydrate(
    store: &dyn WorkPackageStore,
    work_package_id: Uuid,
    now: NaiveDate,
) -> Result<WorkPackageView> {
    let work_package = store.fetch_work_package(work_package_id).await?;
    let mut phases = store.fetch_phases_with_items(work_package_id).await?;

    // Stable: ties keep the store's insertion order
    phases.sort_by_key(|(phase, _)| phase.position);

    let mut phase_views = Vec::with_capacity(phases.len());
    let mut completed_items = 0usize;
    let mut total_items = 0usize;

    for (index, (phase, items)) in phases.into_iter().enumerate() {
        let mut item_views = Vec::with_capacity(items.len());
        let mut phase_completed = 0usize;

        for item in items {
            let view = hydrate_item(store, item).await?;
            if view.complete {
                phase_completed += 1;
            }
            item_views.push(view);
        }

        completed_items += phase_completed;
        total_items += item_views.len();

        // Only the first phase borrows the package-level start date
        let effective_date = phase.estimated_start_date.or(if index == 0 {
            work_package.effective_start_date
        } else {
            None
        });
        let expected_end_date = resolve_expected_end(&phase, effective_date);
        let timeline_status = classify(
            phase.status,
            phase.actual_end_date,
            phase.estimated_end_date,
            expected_end_date,
            now,
            DEFAULT_RISK_WINDOW_DAYS,
        );

        let progress = ratio(phase_completed, item_views.len());
        phase_views.push(PhaseView {
            phase,
            effective_date,
            expected_end_date,
            timeline_status,
            items: item_views,
            progress,
        });
    }

    let current_phase = phase_views
        .iter()
        .find(|view| view.phase.status != WorkStatus::Completed)
        .map(|view| PhaseRef {
            id: view.phase.id,
            name: view.phase.name.clone(),
            position: view.phase.position,
        });

    debug!(
        work_package_id = %work_package_id,
        phases = phase_views.len(),
        items = total_items,
        "Hydrated work package"
    );

    Ok(WorkPackageView {
        id: work_package.id,
        name: work_package.name,
        effective_start_date: work_package.effective_start_date,
        phases: phase_views,
        current_phase,
        progress: ratio(completed_items, total_items),
    })
}

async fn hydrate_item(store: &dyn WorkPackageStore, item: Item) -> Result<ItemView> {
    let collateral = store.fetch_collateral_by_item_id(item.id).await?;

    let approved = collateral
        .iter()
        .filter(|c| c.status == CollateralStatus::Approved)
        .count() as i64;
    let total = item.quantity.max(1);
    let completed = approved.min(total);
    let complete = approved >= total;

    Ok(ItemView {
        item,
        collateral,
        progress: ItemProgress {
            completed,
            total,
            percentage: (completed as f64 / total as f64) * 100.0,
        },
        complete,
    })
}

fn ratio(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

// Phase-level behavior is covered by integration tests against the SQLite
// store; only the arithmetic lives here.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_empty_sets() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(1, 2), 0.5);
        assert_eq!(ratio(3, 3), 1.0);
    }
}
