//! Health check handlers.
//!
//! `/health/live` only says the process is up. `/health/ready` reports
//! whether a map engine is loaded and answers 503 while the service runs
//! degraded. `/health` is the plain `{"status":"healthy"}` probe.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::state::EngineStatus;
use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok", or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Number of waypoints loaded (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waypoints_loaded: Option<usize>,

    /// Number of directed edges loaded (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges_loaded: Option<usize>,

    /// Configured map size in pixels (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_width: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_height: Option<f64>,

    /// RFC 3339 time of the last engine load or failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            waypoints_loaded: None,
            edges_loaded: None,
            map_width: None,
            map_height: None,
            since: None,
        }
    }

    pub fn ready(service: &str, version: &str, engine: &EngineStatus) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            waypoints_loaded: engine.waypoints,
            edges_loaded: engine.edges,
            map_width: engine.map_width,
            map_height: engine.map_height,
            since: Some(engine.since.clone()),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            waypoints_loaded: None,
            edges_loaded: None,
            map_width: None,
            map_height: None,
            since: None,
        }
    }
}

/// Basic health probe.
///
/// ```text
/// GET /health
/// {"status":"healthy"}
/// ```
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"Pathfinding Service","version":"0.1.0"}
/// ```
pub async fn health_live(State(state): State<AppState>) -> impl IntoResponse {
    let status = HealthStatus::alive(state.app_name(), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"Pathfinding Service","version":"0.1.0","waypoints_loaded":412,"edges_loaded":977,"since":"..."}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = state.app_name();
    let version = env!("CARGO_PKG_VERSION");
    let engine = state.status();

    if !engine.ready {
        let reason = engine.reason.as_deref().unwrap_or("engine not loaded");
        let status = HealthStatus::not_ready(service, version, reason);
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    if engine.waypoints == Some(0) {
        let status = HealthStatus::not_ready(service, version, "no waypoints loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(service, version, &engine);
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("test-service", "1.0.0");
        assert_eq!(status.status, "ok");
        assert_eq!(status.service, "test-service");
        assert!(status.waypoints_loaded.is_none());
    }

    #[test]
    fn test_health_status_ready() {
        let engine = EngineStatus {
            ready: true,
            waypoints: Some(7),
            edges: Some(8),
            source: Some("json:map.json".to_string()),
            reason: None,
            map_width: Some(8500.0),
            map_height: Some(7801.0),
            since: "2026-01-01T00:00:00+00:00".to_string(),
        };
        let status = HealthStatus::ready("test-service", "1.0.0", &engine);
        assert_eq!(status.status, "ok");
        assert_eq!(status.waypoints_loaded, Some(7));
        assert_eq!(status.edges_loaded, Some(8));
        assert_eq!(status.map_width, Some(8500.0));
    }

    #[test]
    fn test_health_status_not_ready() {
        let status = HealthStatus::not_ready("test-service", "1.0.0", "no data");
        assert!(status.status.starts_with("not_ready:"));
        assert!(status.status.contains("no data"));
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::alive("pixelroute", "0.1.0");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("waypoints_loaded"));
    }
}
