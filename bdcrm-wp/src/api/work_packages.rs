//! Work package API handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{WorkPackage, WorkPackageView};
use crate::services;
use crate::store::WorkPackageStore;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/work-packages", post(create_work_package))
        .route("/work-packages/:id", get(get_work_package))
}

/// POST /work-packages request
#[derive(Debug, Deserialize)]
pub struct CreateWorkPackageRequest {
    pub name: String,
    #[serde(default)]
    pub effective_start_date: Option<NaiveDate>,
}

/// POST /work-packages
async fn create_work_package(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkPackageRequest>,
) -> ApiResult<Json<WorkPackage>> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "work package name must not be empty".to_string(),
        ));
    }

    let mut work_package = WorkPackage::new(request.name.trim());
    work_package.effective_start_date = request.effective_start_date;
    state.store.create_work_package(&work_package).await?;

    tracing::info!(work_package_id = %work_package.id, "Work package created");

    Ok(Json(work_package))
}

/// GET /work-packages/:id
///
/// Returns the fully hydrated view. The clock is read once here, at the
/// request edge, and injected into the read path.
async fn get_work_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WorkPackageView>> {
    let now = Utc::now().date_naive();
    let view = services::hydrate(state.store.as_ref(), id, now).await?;
    Ok(Json(view))
}
