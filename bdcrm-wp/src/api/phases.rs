//! Phase API handlers
//!
//! Status changes are monotonic: a regression attempt returns 409 and the
//! stored record is untouched. Schedule fields use patch semantics where an
//! omitted field is unchanged and an explicit null clears the value.

use axum::{
    extract::{Path, State},
    routing::put,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Phase, WorkStatus};
use crate::services;
use crate::services::recompute::PhaseSchedulePatch;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/phases/:id/status", put(set_status))
        .route("/phases/:id/schedule", put(set_schedule))
}

/// PUT /phases/:id/status request
#[derive(Debug, Deserialize)]
pub struct PhaseStatusRequest {
    pub status: WorkStatus,
}

/// PUT /phases/:id/schedule request
#[derive(Debug, Default, Deserialize)]
pub struct PhaseScheduleRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub timeline_hint: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub actual_start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub actual_end_date: Option<Option<NaiveDate>>,
}

/// Distinguishes an omitted field (outer None) from an explicit null
/// (inner None)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// PUT /phases/:id/status
async fn set_status(
    State(state): State<AppState>,
    Path(phase_id): Path<Uuid>,
    Json(request): Json<PhaseStatusRequest>,
) -> ApiResult<Json<Phase>> {
    let today = Utc::now().date_naive();
    match services::advance_phase_status(state.store.as_ref(), phase_id, request.status, today)
        .await
    {
        Ok(phase) => Ok(Json(phase)),
        Err(bdcrm_common::Error::InvalidInput(msg)) => Err(ApiError::Conflict(msg)),
        Err(other) => Err(other.into()),
    }
}

/// PUT /phases/:id/schedule
async fn set_schedule(
    State(state): State<AppState>,
    Path(phase_id): Path<Uuid>,
    Json(request): Json<PhaseScheduleRequest>,
) -> ApiResult<Json<Phase>> {
    let patch = PhaseSchedulePatch {
        timeline_hint: request.timeline_hint,
        estimated_start_date: request.estimated_start_date,
        estimated_end_date: request.estimated_end_date,
        actual_start_date: request.actual_start_date,
        actual_end_date: request.actual_end_date,
    };

    let phase = services::update_phase_schedule(state.store.as_ref(), phase_id, patch).await?;
    Ok(Json(phase))
}
