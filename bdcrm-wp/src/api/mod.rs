//! HTTP API surface consumed by the upload/preview layer

pub mod collateral;
pub mod health;
pub mod import;
pub mod items;
pub mod phases;
pub mod work_packages;

use axum::Router;

use crate::AppState;

/// All engine routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(work_packages::routes())
        .merge(import::routes())
        .merge(phases::routes())
        .merge(items::routes())
        .merge(collateral::routes())
}
