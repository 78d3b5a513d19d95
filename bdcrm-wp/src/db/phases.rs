//! Phase database operations
//!
//! Includes the transactional bulk-import commit: reviewed drafts land
//! all-or-nothing, and phase totals are recomputed inside the same
//! transaction so the derived aggregate can never observe a half-applied
//! batch.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use bdcrm_common::{Error, Result};

use crate::import::phase_grouper::PhaseDraft;
use crate::models::{Item, Phase};
use crate::store::ImportSummary;
use crate::timeline::duration::calculate_phase_total_duration;

use super::{items, parse_opt_date, parse_uuid, parse_work_status};

pub(crate) fn row_to_phase(row: &SqliteRow) -> Result<Phase> {
    Ok(Phase {
        id: parse_uuid(&row.try_get::<String, _>("guid")?)?,
        work_package_id: parse_uuid(&row.try_get::<String, _>("work_package_guid")?)?,
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        timeline_hint: row.try_get("timeline_hint")?,
        estimated_start_date: parse_opt_date(row.try_get("estimated_start_date")?)?,
        estimated_end_date: parse_opt_date(row.try_get("estimated_end_date")?)?,
        actual_start_date: parse_opt_date(row.try_get("actual_start_date")?)?,
        actual_end_date: parse_opt_date(row.try_get("actual_end_date")?)?,
        status: parse_work_status(&row.try_get::<String, _>("status")?)?,
        total_duration_days: row.try_get("total_duration_days")?,
    })
}

const PHASE_COLUMNS: &str = "guid, work_package_guid, name, position, timeline_hint, \
     estimated_start_date, estimated_end_date, actual_start_date, actual_end_date, \
     status, total_duration_days";

/// Save a phase, replacing an existing record with the same guid
pub async fn upsert_phase<'e, E>(executor: E, phase: &Phase) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO phases (
            guid, work_package_guid, name, position, timeline_hint,
            estimated_start_date, estimated_end_date, actual_start_date, actual_end_date,
            status, total_duration_days
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            name = excluded.name,
            position = excluded.position,
            timeline_hint = excluded.timeline_hint,
            estimated_start_date = excluded.estimated_start_date,
            estimated_end_date = excluded.estimated_end_date,
            actual_start_date = excluded.actual_start_date,
            actual_end_date = excluded.actual_end_date,
            status = excluded.status,
            total_duration_days = excluded.total_duration_days,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(phase.id.to_string())
    .bind(phase.work_package_id.to_string())
    .bind(&phase.name)
    .bind(phase.position)
    .bind(&phase.timeline_hint)
    .bind(phase.estimated_start_date.map(|d| d.to_string()))
    .bind(phase.estimated_end_date.map(|d| d.to_string()))
    .bind(phase.actual_start_date.map(|d| d.to_string()))
    .bind(phase.actual_end_date.map(|d| d.to_string()))
    .bind(phase.status.as_str())
    .bind(phase.total_duration_days)
    .execute(executor)
    .await?;

    Ok(())
}

/// Fetch one phase by id
pub async fn fetch_phase(pool: &SqlitePool, phase_id: Uuid) -> Result<Phase> {
    let row = sqlx::query(&format!("SELECT {} FROM phases WHERE guid = ?", PHASE_COLUMNS))
        .bind(phase_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("phase {}", phase_id)))?;

    row_to_phase(&row)
}

/// Fetch a package's phases ordered by position, ties in insertion order
pub async fn fetch_phases(pool: &SqlitePool, work_package_id: Uuid) -> Result<Vec<Phase>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM phases WHERE work_package_guid = ? ORDER BY position ASC, rowid ASC",
        PHASE_COLUMNS
    ))
    .bind(work_package_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_phase).collect()
}

/// Persist the derived total-duration aggregate
pub async fn set_phase_total_duration<'e, E>(
    executor: E,
    phase_id: Uuid,
    total_days: f64,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE phases SET total_duration_days = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(total_days)
    .bind(phase_id.to_string())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("phase {}", phase_id)));
    }

    Ok(())
}

/// Commit reviewed phase drafts in one transaction
///
/// Phases are matched per package by exact name. Existing phases keep their
/// status and dates; position takes `MAX(stored, incoming)` and the timeline
/// hint stays first-wins. Incoming items append after the current tail.
pub async fn commit_import(
    pool: &SqlitePool,
    work_package_id: Uuid,
    drafts: &[PhaseDraft],
) -> Result<ImportSummary> {
    let mut tx = pool.begin().await?;
    let mut items_inserted = 0usize;

    for draft in drafts {
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT guid FROM phases WHERE work_package_guid = ? AND name = ?",
        )
        .bind(work_package_id.to_string())
        .bind(&draft.name)
        .fetch_optional(&mut *tx)
        .await?;

        let phase_id = match existing {
            Some(guid) => {
                sqlx::query(
                    r#"
                    UPDATE phases SET
                        position = MAX(position, ?),
                        timeline_hint = COALESCE(timeline_hint, ?),
                        updated_at = CURRENT_TIMESTAMP
                    WHERE guid = ?
                    "#,
                )
                .bind(draft.position)
                .bind(&draft.timeline_hint)
                .bind(&guid)
                .execute(&mut *tx)
                .await?;
                parse_uuid(&guid)?
            }
            None => {
                let mut phase = Phase::new(work_package_id, draft.name.clone(), draft.position);
                phase.timeline_hint = draft.timeline_hint.clone();
                upsert_phase(&mut *tx, &phase).await?;
                phase.id
            }
        };

        let mut sort_order = items::next_sort_order(&mut *tx, phase_id).await?;
        for item_draft in &draft.items {
            let mut item = Item::new(phase_id, item_draft.item_type.clone(), item_draft.label.clone());
            item.description = item_draft.description.clone();
            item.quantity = item_draft.quantity;
            item.unit_of_measure = item_draft.unit_of_measure.clone();
            item.duration_days = item_draft.duration_days;
            item.sort_order = sort_order;

            items::upsert_item(&mut *tx, &item).await?;
            sort_order += 1;
            items_inserted += 1;
        }

        let phase_items = items::fetch_items_by_phase(&mut *tx, phase_id).await?;
        let total = calculate_phase_total_duration(&phase_items);
        set_phase_total_duration(&mut *tx, phase_id, total).await?;
    }

    tx.commit().await?;

    info!(
        work_package_id = %work_package_id,
        phases = drafts.len(),
        items = items_inserted,
        "Committed deliverable import"
    );

    Ok(ImportSummary {
        phases: drafts.len(),
        items: items_inserted,
    })
}
