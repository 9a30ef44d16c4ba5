//! Health Check API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::TestApp;

/// The health endpoint answers 200 with the fixed status body
#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"status": "OK"}));
}

/// Unknown routes are a plain 404
#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
