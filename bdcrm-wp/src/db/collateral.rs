//! Collateral database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use bdcrm_common::{Error, Result};

use crate::models::Collateral;

use super::{parse_collateral_status, parse_uuid};

fn row_to_collateral(row: &SqliteRow) -> Result<Collateral> {
    Ok(Collateral {
        id: parse_uuid(&row.try_get::<String, _>("guid")?)?,
        item_id: parse_uuid(&row.try_get::<String, _>("item_guid")?)?,
        status: parse_collateral_status(&row.try_get::<String, _>("status")?)?,
        label: row.try_get("label")?,
    })
}

/// Save a collateral record, replacing an existing one with the same guid
pub async fn upsert_collateral(pool: &SqlitePool, record: &Collateral) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO collateral (guid, item_guid, status, label)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            item_guid = excluded.item_guid,
            status = excluded.status,
            label = excluded.label,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.item_id.to_string())
    .bind(record.status.as_str())
    .bind(&record.label)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch one collateral record by id
pub async fn fetch_collateral(pool: &SqlitePool, collateral_id: Uuid) -> Result<Collateral> {
    let row = sqlx::query("SELECT guid, item_guid, status, label FROM collateral WHERE guid = ?")
        .bind(collateral_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("collateral {}", collateral_id)))?;

    row_to_collateral(&row)
}

/// Fetch an item's collateral in creation order
pub async fn fetch_collateral_by_item_id(pool: &SqlitePool, item_id: Uuid) -> Result<Vec<Collateral>> {
    let rows = sqlx::query(
        "SELECT guid, item_guid, status, label FROM collateral WHERE item_guid = ? ORDER BY rowid ASC",
    )
    .bind(item_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_collateral).collect()
}
