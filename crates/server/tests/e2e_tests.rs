//! End-to-end tests for the service endpoints: health, config, progress and metrics.

mod common;

use axum::http::StatusCode;
use common::TestFixture;
use serde_json::json;

// =============================================================================
// Health & Config
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "status", json!("ok"));
}

#[tokio::test]
async fn test_config_endpoint_hides_template_paths() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["templates"]["zones"], json!(["NV", "VIP"]));
    assert!(response.body["templates"].get("dir").is_none());
    assert_eq!(response.body["ticket"]["template_id"], "ticket.png");
    assert_eq!(response.body["ticket"]["qr_size"], 60);
    assert_eq!(response.body["batch"]["wave_size"], 2);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/nope").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Progress
// =============================================================================

#[tokio::test]
async fn test_progress_upsert_and_get() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/progress",
            json!({ "session_id": "s-1", "total": 4, "current": 1, "successful": 1 }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "session_id", json!("s-1"));
    assert_json_path!(response.body, "current", json!(1));
    assert_json_path!(response.body, "completed", json!(false));

    let response = fixture.get("/api/v1/progress?session_id=s-1").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(4));
    assert_json_path!(response.body, "percentage", json!(25));
    assert!(response.body.get("estimated_time_remaining").is_some());
}

#[tokio::test]
async fn test_progress_partial_update_keeps_other_fields() {
    let fixture = TestFixture::new().await;

    fixture
        .post(
            "/api/v1/progress",
            json!({ "session_id": "s-2", "total": 10, "current": 3, "successful": 3 }),
        )
        .await;
    let response = fixture
        .post("/api/v1/progress", json!({ "session_id": "s-2", "failed": 1 }))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(10));
    assert_json_path!(response.body, "successful", json!(3));
    assert_json_path!(response.body, "failed", json!(1));
    // current never falls below successful + failed
    assert_json_path!(response.body, "current", json!(4));
}

#[tokio::test]
async fn test_progress_huge_counters_saturate() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/progress",
            json!({ "session_id": "s-max", "successful": u64::MAX, "failed": 1 }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "current", json!(u64::MAX));
    assert_json_path!(response.body, "total", json!(u64::MAX));

    let response = fixture.get("/api/v1/progress?session_id=s-max").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "percentage", json!(100));
}

#[tokio::test]
async fn test_progress_requires_session_id() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/progress").await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture
        .post("/api/v1/progress", json!({ "session_id": "   ", "total": 1 }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture.delete("/api/v1/progress").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_progress_unknown_session_returns_404() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/progress?session_id=ghost").await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert_json_path!(response.body, "code", json!("not_found"));
}

#[tokio::test]
async fn test_progress_delete_is_idempotent() {
    let fixture = TestFixture::new().await;
    fixture
        .post("/api/v1/progress", json!({ "session_id": "s-3", "total": 1 }))
        .await;

    let response = fixture.delete("/api/v1/progress?session_id=s-3").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "deleted", json!(true));

    let response = fixture.delete("/api/v1/progress?session_id=s-3").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "deleted", json!(false));

    let response = fixture.get("/api/v1/progress?session_id=s-3").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_progress_malformed_json_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_raw("/api/v1/progress", "{not json").await;

    assert!(response.status.is_client_error());
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .header("content-type")
        .unwrap()
        .starts_with("text/plain"));
    let text = String::from_utf8_lossy(&response.bytes);
    assert!(text.contains("ticketpress_progress_sessions"));
    assert!(text.contains("ticketpress_http_requests_total"));
}
