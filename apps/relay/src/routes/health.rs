//! Health check HTTP route handlers
//!
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/live` - Kubernetes-style liveness probe
//! - `GET /health/ready` - Readiness check (verifies the playback backend)

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use jukewire_mopidy_client::MopidyClient;

/// Shared state for health check handlers
#[derive(Clone)]
pub struct HealthState {
    /// Playback backend client, pinged by the readiness probe
    pub backend: MopidyClient,
}

impl HealthState {
    pub fn new(backend: MopidyClient) -> Self {
        Self { backend }
    }
}

#[derive(Debug, Serialize)]
struct ReadinessResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(simple_health))
        .route("/live", get(liveness_probe))
        .route("/ready", get(readiness_probe))
        .with_state(state)
}

/// Simple health check for load balancers
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness probe: the process is up, no dependency checks
async fn liveness_probe() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe: verifies the playback backend answers
///
/// # Response
/// - 200 OK when the backend reports its version
/// - 503 Service Unavailable when the backend is unreachable
async fn readiness_probe(State(state): State<HealthState>) -> impl IntoResponse {
    match state.backend.version().await {
        Ok(version) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                backend_version: Some(version),
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not ready",
                backend_version: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}
