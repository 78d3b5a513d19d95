//! HTTP API integration tests
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot`
//! against an in-memory database.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bdcrm_wp::db::{init_tables, SqliteStore};
use bdcrm_wp::{build_router, AppState};

async fn test_app() -> axum::Router {
    let pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    init_tables(&pool).await.unwrap();
    build_router(AppState::new(SqliteStore::new(pool)))
}

fn request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// One round trip helper: send and parse
async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

fn import_payload(rows: Value) -> Value {
    json!({
        "headers": ["Phase", "Pos", "Item", "Type", "Qty", "Days"],
        "mapping": {
            "Phase": "phaseName",
            "Pos": "phasePosition",
            "Item": "itemLabel",
            "Type": "itemType",
            "Qty": "quantity",
            "Days": "duration"
        },
        "rows": rows
    })
}

fn fixture_payload() -> Value {
    import_payload(json!([
        {"Phase": "Setup", "Pos": "1", "Item": "Kickoff", "Type": "meeting", "Qty": "1", "Days": "1"},
        {"Phase": "Build", "Pos": "2", "Item": "Draft", "Type": "document", "Qty": "3", "Days": "2"},
        {"Phase": "Build", "Pos": "2", "Item": "Review", "Type": "review", "Qty": "1", "Days": "1"}
    ]))
}

async fn create_work_package(app: &axum::Router) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/work-packages",
            &json!({"name": "Website relaunch"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_service_identity() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "bdcrm-wp");
}

#[tokio::test]
async fn validate_reports_missing_required_fields() {
    let app = test_app().await;
    let work_package_id = create_work_package(&app).await;

    // Mapping covers itemType but not itemLabel
    let payload = json!({
        "headers": ["Type"],
        "mapping": {"Type": "itemType"},
        "rows": []
    });

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/work-packages/{}/import/validate", work_package_id),
            &payload,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], json!(false));
    assert_eq!(body["missing_required"], json!(["itemLabel"]));
}

#[tokio::test]
async fn invalid_mapping_gates_commit_entirely() {
    let app = test_app().await;
    let work_package_id = create_work_package(&app).await;

    let payload = json!({
        "headers": ["Type"],
        "mapping": {"Type": "itemType"},
        "rows": [{"Type": "document"}]
    });

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/work-packages/{}/import/commit", work_package_id),
            &payload,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // Nothing was transformed or persisted
    let (status, body) = send(
        &app,
        get(&format!("/work-packages/{}", work_package_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phases"], json!([]));
}

#[tokio::test]
async fn commit_with_zero_usable_rows_is_rejected() {
    let app = test_app().await;
    let work_package_id = create_work_package(&app).await;

    // Valid mapping, but every row is missing its label cell
    let payload = import_payload(json!([
        {"Type": "document"},
        {"Type": "review"}
    ]));

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/work-packages/{}/import/commit", work_package_id),
            &payload,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("no usable rows"));
}

#[tokio::test]
async fn preview_returns_drafts_and_row_errors_without_persisting() {
    let app = test_app().await;
    let work_package_id = create_work_package(&app).await;

    let payload = import_payload(json!([
        {"Phase": "Setup", "Pos": "1", "Item": "Kickoff", "Type": "meeting"},
        {"Phase": "Setup", "Pos": "1", "Type": "meeting"}
    ]));

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/work-packages/{}/import/preview", work_package_id),
            &payload,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid_rows"], json!(1));
    assert_eq!(body["total_rows"], json!(2));
    assert_eq!(body["row_errors"], json!(["Row 2: missing itemLabel"]));
    assert_eq!(body["phases"][0]["name"], "Setup");

    // Preview persisted nothing
    let (_, view) = send(
        &app,
        get(&format!("/work-packages/{}", work_package_id)),
    )
    .await;
    assert_eq!(view["phases"], json!([]));
}

#[tokio::test]
async fn commit_then_hydrate_round_trip() {
    let app = test_app().await;
    let work_package_id = create_work_package(&app).await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/work-packages/{}/import/commit", work_package_id),
            &fixture_payload(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phases"], json!(2));
    assert_eq!(body["items"], json!(3));

    let (status, view) = send(
        &app,
        get(&format!("/work-packages/{}", work_package_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(view["phases"][0]["name"], "Setup");
    assert_eq!(view["phases"][0]["position"], json!(1));
    assert_eq!(view["phases"][0]["total_duration_days"], json!(1.0));
    assert_eq!(view["phases"][1]["name"], "Build");
    assert_eq!(view["phases"][1]["total_duration_days"], json!(7.0));
    assert_eq!(view["phases"][1]["items"].as_array().unwrap().len(), 2);

    // Fresh import: everything NOT_STARTED, so the first phase is current
    assert_eq!(view["current_phase"]["position"], json!(1));
    assert_eq!(view["current_phase"]["name"], "Setup");
    assert_eq!(view["progress"], json!(0.0));

    // No schedule data anywhere: phases degrade to UNSCHEDULED
    assert_eq!(view["phases"][0]["timeline_status"], "UNSCHEDULED");
}

#[tokio::test]
async fn item_create_recomputes_phase_total() {
    let app = test_app().await;
    let work_package_id = create_work_package(&app).await;

    send(
        &app,
        request(
            Method::POST,
            &format!("/work-packages/{}/import/commit", work_package_id),
            &fixture_payload(),
        ),
    )
    .await;

    let (_, view) = send(
        &app,
        get(&format!("/work-packages/{}", work_package_id)),
    )
    .await;
    let setup_id = view["phases"][0]["id"].as_str().unwrap().to_string();

    // 4 hours of work → half a day
    let (status, item) = send(
        &app,
        request(
            Method::POST,
            &format!("/phases/{}/items", setup_id),
            &json!({
                "item_type": "workshop",
                "label": "Design review",
                "unit_of_measure": "hour",
                "duration": 4.0
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["duration_days"], json!(0.5));

    let (_, view) = send(
        &app,
        get(&format!("/work-packages/{}", work_package_id)),
    )
    .await;
    assert_eq!(view["phases"][0]["total_duration_days"], json!(1.5));
}

#[tokio::test]
async fn phase_status_regression_returns_conflict() {
    let app = test_app().await;
    let work_package_id = create_work_package(&app).await;

    send(
        &app,
        request(
            Method::POST,
            &format!("/work-packages/{}/import/commit", work_package_id),
            &fixture_payload(),
        ),
    )
    .await;

    let (_, view) = send(
        &app,
        get(&format!("/work-packages/{}", work_package_id)),
    )
    .await;
    let setup_id = view["phases"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            &format!("/phases/{}/status", setup_id),
            &json!({"status": "IN_PROGRESS"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/phases/{}/status", setup_id),
            &json!({"status": "NOT_STARTED"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn collateral_approval_drives_item_progress() {
    let app = test_app().await;
    let work_package_id = create_work_package(&app).await;

    send(
        &app,
        request(
            Method::POST,
            &format!("/work-packages/{}/import/commit", work_package_id),
            &fixture_payload(),
        ),
    )
    .await;

    let (_, view) = send(
        &app,
        get(&format!("/work-packages/{}", work_package_id)),
    )
    .await;
    // Setup / Kickoff, quantity 1
    let item_id = view["phases"][0]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, collateral) = send(
        &app,
        request(
            Method::POST,
            &format!("/items/{}/collateral", item_id),
            &json!({"label": "Kickoff notes"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(collateral["status"], "DRAFT");
    let collateral_id = collateral["id"].as_str().unwrap().to_string();

    let (status, collateral) = send(
        &app,
        request(
            Method::PUT,
            &format!("/collateral/{}", collateral_id),
            &json!({"status": "APPROVED"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(collateral["status"], "APPROVED");

    let (_, view) = send(
        &app,
        get(&format!("/work-packages/{}", work_package_id)),
    )
    .await;
    let item = &view["phases"][0]["items"][0];
    assert_eq!(item["progress"]["percentage"], json!(100.0));
    assert_eq!(item["complete"], json!(true));
    // 1 of 3 items complete
    assert!((view["progress"].as_f64().unwrap() - 1.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn unknown_work_package_is_404() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        get("/work-packages/00000000-0000-0000-0000-000000000000"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
