//! Item API handlers
//!
//! Every mutation here triggers the incremental phase-total recompute in
//! the services layer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Item, WorkStatus};
use crate::services;
use crate::store::WorkPackageStore;
use crate::timeline::duration::normalize_duration;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/phases/:id/items", post(create_item))
        .route("/items/:id", put(update_item).delete(delete_item))
}

/// POST /phases/:id/items request
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub item_type: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub estimated_hours_each: Option<f64>,
    /// Raw duration in `unit_of_measure` units
    #[serde(default = "default_duration")]
    pub duration: f64,
}

fn default_quantity() -> i64 {
    1
}

fn default_duration() -> f64 {
    1.0
}

/// PUT /items/:id request; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub item_type: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_of_measure: Option<String>,
    pub estimated_hours_each: Option<f64>,
    /// Raw duration in the item's (possibly updated) unit
    pub duration: Option<f64>,
    pub status: Option<WorkStatus>,
}

/// POST /phases/:id/items
async fn create_item(
    State(state): State<AppState>,
    Path(phase_id): Path<Uuid>,
    Json(request): Json<CreateItemRequest>,
) -> ApiResult<Json<Item>> {
    if request.label.trim().is_empty() {
        return Err(ApiError::BadRequest("item label must not be empty".to_string()));
    }
    if request.item_type.trim().is_empty() {
        return Err(ApiError::BadRequest("item type must not be empty".to_string()));
    }

    let mut item = Item::new(phase_id, request.item_type.trim(), request.label.trim());
    item.description = request.description;
    item.quantity = request.quantity.max(1);
    item.duration_days = normalize_duration(request.duration, request.unit_of_measure.as_deref());
    item.unit_of_measure = request.unit_of_measure;
    item.estimated_hours_each = request.estimated_hours_each;

    let item = services::create_item(state.store.as_ref(), phase_id, item).await?;
    Ok(Json(item))
}

/// PUT /items/:id
async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> ApiResult<Json<Item>> {
    let mut item = state.store.fetch_item(item_id).await?;

    if let Some(item_type) = request.item_type {
        item.item_type = item_type;
    }
    if let Some(label) = request.label {
        if label.trim().is_empty() {
            return Err(ApiError::BadRequest("item label must not be empty".to_string()));
        }
        item.label = label;
    }
    if let Some(description) = request.description {
        item.description = Some(description);
    }
    if let Some(quantity) = request.quantity {
        item.quantity = quantity.max(1);
    }
    if let Some(unit) = request.unit_of_measure {
        item.unit_of_measure = Some(unit);
    }
    if let Some(hours) = request.estimated_hours_each {
        item.estimated_hours_each = Some(hours);
    }
    if let Some(duration) = request.duration {
        // Re-normalize against the item's current unit
        item.duration_days = normalize_duration(duration, item.unit_of_measure.as_deref());
    }
    if let Some(status) = request.status {
        item.status = status;
    }

    services::update_item(state.store.as_ref(), &item).await?;
    Ok(Json(item))
}

/// DELETE /items/:id
async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services::delete_item(state.store.as_ref(), item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
