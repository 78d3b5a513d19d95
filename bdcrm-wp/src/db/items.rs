//! Item database operations

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use bdcrm_common::{Error, Result};

use crate::models::Item;

use super::{parse_uuid, parse_work_status};

pub(crate) fn row_to_item(row: &SqliteRow) -> Result<Item> {
    Ok(Item {
        id: parse_uuid(&row.try_get::<String, _>("guid")?)?,
        phase_id: parse_uuid(&row.try_get::<String, _>("phase_guid")?)?,
        item_type: row.try_get("item_type")?,
        label: row.try_get("label")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        unit_of_measure: row.try_get("unit_of_measure")?,
        estimated_hours_each: row.try_get("estimated_hours_each")?,
        duration_days: row.try_get("duration_days")?,
        status: parse_work_status(&row.try_get::<String, _>("status")?)?,
        sort_order: row.try_get("sort_order")?,
    })
}

/// Save an item, replacing an existing record with the same guid
pub async fn upsert_item<'e, E>(executor: E, item: &Item) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO items (
            guid, phase_guid, item_type, label, description, quantity,
            unit_of_measure, estimated_hours_each, duration_days, status, sort_order
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            phase_guid = excluded.phase_guid,
            item_type = excluded.item_type,
            label = excluded.label,
            description = excluded.description,
            quantity = excluded.quantity,
            unit_of_measure = excluded.unit_of_measure,
            estimated_hours_each = excluded.estimated_hours_each,
            duration_days = excluded.duration_days,
            status = excluded.status,
            sort_order = excluded.sort_order,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(item.id.to_string())
    .bind(item.phase_id.to_string())
    .bind(&item.item_type)
    .bind(&item.label)
    .bind(&item.description)
    .bind(item.quantity)
    .bind(&item.unit_of_measure)
    .bind(item.estimated_hours_each)
    .bind(item.duration_days)
    .bind(item.status.as_str())
    .bind(item.sort_order)
    .execute(executor)
    .await?;

    Ok(())
}

/// Fetch one item by id
pub async fn fetch_item<'e, E>(executor: E, item_id: Uuid) -> Result<Item>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT guid, phase_guid, item_type, label, description, quantity,
               unit_of_measure, estimated_hours_each, duration_days, status, sort_order
        FROM items WHERE guid = ?
        "#,
    )
    .bind(item_id.to_string())
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| Error::NotFound(format!("item {}", item_id)))?;

    row_to_item(&row)
}

/// Fetch a phase's items in stable (import) order
pub async fn fetch_items_by_phase<'e, E>(executor: E, phase_id: Uuid) -> Result<Vec<Item>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT guid, phase_guid, item_type, label, description, quantity,
               unit_of_measure, estimated_hours_each, duration_days, status, sort_order
        FROM items WHERE phase_guid = ?
        ORDER BY sort_order ASC, rowid ASC
        "#,
    )
    .bind(phase_id.to_string())
    .fetch_all(executor)
    .await?;

    rows.iter().map(row_to_item).collect()
}

/// Delete an item; collateral rows are left for audit
pub async fn delete_item<'e, E>(executor: E, item_id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("DELETE FROM items WHERE guid = ?")
        .bind(item_id.to_string())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("item {}", item_id)));
    }

    Ok(())
}

/// Next free sort_order at the tail of a phase
pub async fn next_sort_order<'e, E>(executor: E, phase_id: Uuid) -> Result<i64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let max: Option<i64> =
        sqlx::query_scalar("SELECT MAX(sort_order) FROM items WHERE phase_guid = ?")
            .bind(phase_id.to_string())
            .fetch_one(executor)
            .await?;

    Ok(max.map(|m| m + 1).unwrap_or(0))
}
