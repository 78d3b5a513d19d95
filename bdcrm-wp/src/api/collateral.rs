//! Collateral API handlers
//!
//! Collateral moves DRAFT → IN_REVIEW → APPROVED/REJECTED outside the
//! engine; only APPROVED records count toward item completion, which the
//! hydrator derives at read time.

use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{Collateral, CollateralStatus};
use crate::store::WorkPackageStore;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items/:id/collateral", post(create_collateral))
        .route("/collateral/:id", put(set_status))
}

/// POST /items/:id/collateral request
#[derive(Debug, Default, Deserialize)]
pub struct CreateCollateralRequest {
    #[serde(default)]
    pub label: Option<String>,
}

/// PUT /collateral/:id request
#[derive(Debug, Deserialize)]
pub struct CollateralStatusRequest {
    pub status: CollateralStatus,
}

/// POST /items/:id/collateral
async fn create_collateral(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<CreateCollateralRequest>,
) -> ApiResult<Json<Collateral>> {
    // 404 on unknown items rather than orphaning collateral
    state.store.fetch_item(item_id).await?;

    let mut record = Collateral::new(item_id);
    record.label = request.label;
    state.store.upsert_collateral(&record).await?;

    Ok(Json(record))
}

/// PUT /collateral/:id
async fn set_status(
    State(state): State<AppState>,
    Path(collateral_id): Path<Uuid>,
    Json(request): Json<CollateralStatusRequest>,
) -> ApiResult<Json<Collateral>> {
    let mut record = state.store.fetch_collateral(collateral_id).await?;
    record.status = request.status;
    state.store.upsert_collateral(&record).await?;

    Ok(Json(record))
}
