use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use utoipa::ToSchema;

use crate::{datasets::DatasetCounts, handlers::AppState};

/// Tracks application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time (call this on application startup)
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
    #[schema(example = "ready")]
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub dataset: DatasetCounts,
}

/// Basic liveness probe - just checks if the service is running
async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Readiness probe; the dataset is validated before the server starts, so
/// reaching this handler means it is loaded.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service ready", body = ReadinessResponse)
    ),
    tag = "health"
)]
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime_secs(),
        dataset: state.dataset.counts(),
    })
}

/// Creates the router for health check endpoints
///
/// Endpoints:
/// - GET /health        - Liveness probe
/// - GET /health/live   - Liveness probe
/// - GET /health/ready  - Readiness probe with dataset record counts
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness_check))
        .route("/live", get(liveness_check))
        .route("/ready", get(readiness_check))
}
