//! Prometheus metrics for the pixelroute service.
//!
//! This module provides:
//! - [`MetricsConfig`]: Configuration for the metrics system
//! - [`init_metrics`]: Initialize the Prometheus metrics recorder
//! - [`metrics_handler`]: Axum handler for the `/metrics` endpoint
//! - Business metric helpers for path and nearest-waypoint queries
//!
//! # Example
//!
//! ```no_run
//! use pixelroute_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! let app: Router = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Path for the metrics endpoint (e.g., "/metrics").
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// - `METRICS_ENABLED`: "true" or "false" (default: true)
    /// - `METRICS_PATH`: Path for metrics endpoint (default: "/metrics")
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let path = std::env::var("METRICS_PATH").unwrap_or_else(|_| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Install the Prometheus recorder.
///
/// Must be called once at startup before any metrics are recorded.
///
/// # Errors
///
/// Returns an error if metrics are disabled, the recorder is already
/// installed, or the Prometheus builder fails.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Returns `None` if [`init_metrics`] has not been called.
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Axum handler for the `/metrics` endpoint (Prometheus exposition text).
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Increments `pixelroute_paths_found_total`.
///
/// * `algorithm` - "a-star" or "dijkstra"
/// * `endpoint` - "find-path" or "route"
pub fn record_path_found(algorithm: &str, endpoint: &str) {
    metrics::counter!(
        "pixelroute_paths_found_total",
        "algorithm" => algorithm.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}

/// Increments `pixelroute_paths_failed_total`.
///
/// * `reason` - e.g. "no_path", "no_nearby_waypoint", "unknown_waypoint",
///   "validation_error", "unavailable"
pub fn record_path_failed(reason: &str, endpoint: &str) {
    metrics::counter!(
        "pixelroute_paths_failed_total",
        "reason" => reason.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}

/// Records to the `pixelroute_path_hops` histogram.
pub fn record_path_hops(hops: usize, algorithm: &str) {
    metrics::histogram!(
        "pixelroute_path_hops",
        "algorithm" => algorithm.to_string()
    )
    .record(hops as f64);
}

/// Increments `pixelroute_nearest_queries_total`.
///
/// * `outcome` - "found", "none", "invalid", or "unavailable"
pub fn record_nearest_query(outcome: &str) {
    metrics::counter!(
        "pixelroute_nearest_queries_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_metrics_handler_returns_prometheus_format() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let output = rt.block_on(async { metrics_handler().await });

        assert!(
            output.contains('#') || output.is_empty(),
            "Metrics output should be Prometheus format or indicate not initialized"
        );
    }

    #[test]
    fn test_business_metric_helpers_do_not_panic() {
        // No recorder is installed in unit tests; the macros must be no-ops.
        record_path_found("a-star", "find-path");
        record_path_failed("no_path", "route");
        record_path_hops(4, "dijkstra");
        record_nearest_query("found");
        record_nearest_query("none");
    }

    #[test]
    fn test_metrics_error_display() {
        assert_eq!(MetricsError::Disabled.to_string(), "metrics are disabled");
        assert_eq!(
            MetricsError::AlreadyInitialized.to_string(),
            "metrics recorder already initialized"
        );
        let failed = MetricsError::InstallFailed("test error".to_string());
        assert!(failed.to_string().contains("test error"));
    }
}
