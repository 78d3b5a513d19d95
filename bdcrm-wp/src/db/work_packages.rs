//! Work package database operations

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use bdcrm_common::{Error, Result};

use crate::models::WorkPackage;

use super::{parse_opt_date, parse_uuid};

/// Insert a work package record
pub async fn insert_work_package(pool: &SqlitePool, work_package: &WorkPackage) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO work_packages (guid, name, effective_start_date)
        VALUES (?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            name = excluded.name,
            effective_start_date = excluded.effective_start_date,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(work_package.id.to_string())
    .bind(&work_package.name)
    .bind(work_package.effective_start_date.map(|d| d.to_string()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a work package by id
pub async fn fetch_work_package(pool: &SqlitePool, id: Uuid) -> Result<WorkPackage> {
    let row = sqlx::query(
        "SELECT guid, name, effective_start_date FROM work_packages WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("work package {}", id)))?;

    Ok(WorkPackage {
        id: parse_uuid(&row.try_get::<String, _>("guid")?)?,
        name: row.try_get("name")?,
        effective_start_date: parse_opt_date(row.try_get("effective_start_date")?)?,
    })
}
