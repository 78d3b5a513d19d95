//! Bulk import API handlers
//!
//! POST /work-packages/:id/import/{validate,preview,commit}
//!
//! Mapping validation gates both preview and commit: an invalid mapping is
//! fatal for the whole import and the transform is never invoked. Row-level
//! failures are non-fatal as long as at least one row survives.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::import::{group_into_phases, transform_rows, validate_mappings, PhaseDraft};
use crate::models::{FieldMapping, MappingValidation, TransformReport};
use crate::store::WorkPackageStore;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/work-packages/:id/import/validate", post(validate))
        .route("/work-packages/:id/import/preview", post(preview))
        .route("/work-packages/:id/import/commit", post(commit))
}

/// Import payload: uploaded headers, the wizard's mapping, and raw rows
/// (header → cell). CSV tokenization happened upstream.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub headers: Vec<String>,
    pub mapping: FieldMapping,
    pub rows: Vec<HashMap<String, String>>,
}

/// POST .../import/preview response
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub phases: Vec<PhaseDraft>,
    pub valid_rows: usize,
    pub total_rows: usize,
    pub row_errors: Vec<String>,
}

/// POST .../import/commit response
#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub phases: usize,
    pub items: usize,
    /// Rows skipped during normalization, reported as warnings
    pub row_errors: Vec<String>,
}

/// POST /work-packages/:id/import/validate
///
/// Pure mapping check; always 200 so the wizard can render the report.
async fn validate(
    Path(_id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> Json<MappingValidation> {
    Json(validate_mappings(&request.mapping, &request.headers))
}

/// POST /work-packages/:id/import/preview
///
/// Transforms and groups without persisting anything.
async fn preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<PreviewResponse>> {
    state.store.fetch_work_package(id).await?;
    ensure_valid_mapping(&request)?;

    let report = transform_rows(&request.rows, &request.mapping);
    let phases = group_into_phases(&report.rows);

    Ok(Json(PreviewResponse {
        phases,
        valid_rows: report.rows.len(),
        total_rows: request.rows.len(),
        row_errors: render_errors(&report),
    }))
}

/// POST /work-packages/:id/import/commit
///
/// All-or-nothing: grouped phases land in one transaction, or nothing is
/// persisted when validation fails or no row survives normalization.
async fn commit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<CommitResponse>> {
    state.store.fetch_work_package(id).await?;
    ensure_valid_mapping(&request)?;

    let report = transform_rows(&request.rows, &request.mapping);
    if report.rows.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "no usable rows in import ({} rejected)",
            report.errors.len()
        )));
    }

    let phases = group_into_phases(&report.rows);
    let summary = state.store.commit_import(id, &phases).await?;

    tracing::info!(
        work_package_id = %id,
        phases = summary.phases,
        items = summary.items,
        skipped_rows = report.errors.len(),
        "Import committed"
    );

    Ok(Json(CommitResponse {
        phases: summary.phases,
        items: summary.items,
        row_errors: render_errors(&report),
    }))
}

fn ensure_valid_mapping(request: &ImportRequest) -> Result<(), ApiError> {
    let validation = validate_mappings(&request.mapping, &request.headers);
    if !validation.is_valid {
        return Err(ApiError::BadRequest(format!(
            "mapping is missing required fields: {}",
            validation.missing_required.join(", ")
        )));
    }
    Ok(())
}

fn render_errors(report: &TransformReport) -> Vec<String> {
    report.errors.iter().map(ToString::to_string).collect()
}
