//! Shared infrastructure for the pixelroute HTTP service.
//!
//! - [`AppState`]: The loaded map engine, swappable at runtime on reload
//! - [`health`]: Health check handlers for liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ServiceResponse`]: Wrapper for successful responses with content type
//! - [`ServiceConfig`]: Port, dataset path, and CORS settings from the environment
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request ID and metrics middleware
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! Handlers stay thin; every map query is answered by `pixelroute-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON                                       │
//! │  - Validate parameters                                      │
//! │  - Call pixelroute-lib APIs on an engine snapshot           │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides a fixture-backed state for handler
//! testing. Enable the `test-utils` feature to access it from dependent crates.

pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ServiceConfig;
pub use health::{health, health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_nearest_query, record_path_failed, record_path_found,
    record_path_hops, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_NO_NEARBY_WAYPOINT, PROBLEM_PATH_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE,
    PROBLEM_UNKNOWN_WAYPOINT,
};
pub use request::{
    NamedRouteRequest, NearestRequest, PathRequest, Validate, NEAREST_ENDPOINT_MAX_DISTANCE,
};
pub use response::{NearestResponse, PathResponse, ServiceResponse};
pub use state::{AppState, AppStateError, EngineSlot, EngineStatus};
