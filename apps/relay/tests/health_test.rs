//! Integration tests for the relay's HTTP surface
//!
//! Exercises the root banner and health probes against the fully wired
//! application router, with a mock playback backend behind the
//! readiness check.

use axum::{body::Body, http::Request, http::StatusCode, Router};
use serde_json::json;
use tower::ServiceExt;

use jukewire_test_utils::MockMopidyServer;

async fn app_with_backend(server: &MockMopidyServer) -> Router {
    // The directory is never contacted by these routes
    jukewire_relay::build_app(&server.url(), "http://127.0.0.1:1").unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = MockMopidyServer::start().await;
    let app = app_with_backend(&server).await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assert!(body_str.contains("Jukewire"));
}

#[tokio::test]
async fn test_simple_health_check() {
    let server = MockMopidyServer::start().await;
    let app = app_with_backend(&server).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_liveness_probe() {
    let server = MockMopidyServer::start().await;
    let app = app_with_backend(&server).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "alive");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_probe_with_healthy_backend() {
    let server = MockMopidyServer::start().await;
    server.mock_rpc("core.get_version", json!("3.4.2")).await;
    let app = app_with_backend(&server).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ready");
    assert_eq!(json["backend_version"], "3.4.2");
}

#[tokio::test]
async fn test_readiness_probe_with_unreachable_backend() {
    let app = jukewire_relay::build_app("http://127.0.0.1:1", "http://127.0.0.1:1").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "not ready");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let server = MockMopidyServer::start().await;
    let app = app_with_backend(&server).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
