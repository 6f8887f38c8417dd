//! Pathfinding HTTP service.
//!
//! Serves shortest-route queries over a pixel-map waypoint graph to a
//! browser map front-end.
//!
//! # Endpoints
//!
//! - `GET /api/pathfinding/nodes` - Every waypoint, in load order
//! - `POST /api/pathfinding/find-nearest-node` - Closest waypoint to a clicked point
//! - `POST /api/pathfinding/find-path` - Route between two clicked points
//! - `POST /api/pathfinding/route` - Route between two waypoint names
//! - `GET /` - Service banner
//! - `GET /health`, `GET /health/live`, `GET /health/ready` - Probes
//! - `GET /metrics` - Prometheus metrics endpoint
//!
//! Every response carries an `X-Request-ID` header, and errors are RFC 9457
//! problem documents whose `instance` is that ID.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info, warn};

use pixelroute_lib::{Engine, Error as LibError, Path, PointRoute};
use pixelroute_service_shared::{
    from_lib_error, health, health_live, health_ready, metrics_handler, record_nearest_query,
    record_path_failed, record_path_found, record_path_hops, AppState, MetricsConfig,
    MetricsLayer, NamedRouteRequest, NearestRequest, NearestResponse, PathRequest, PathResponse,
    ProblemDetails, RequestId, ServiceConfig, ServiceResponse, Validate,
};

pub const API_PREFIX: &str = "/api/pathfinding";

const FIND_PATH: &str = "find-path";
const ROUTE: &str = "route";

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            ApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

/// Build the service router.
///
/// The metrics route is only mounted when `metrics.enabled` is set.
pub fn app(state: AppState, service: &ServiceConfig, metrics: &MetricsConfig) -> Router {
    let api = Router::new()
        .route("/nodes", get(nodes_handler))
        .route("/find-nearest-node", post(find_nearest_handler))
        .route("/find-path", post(find_path_handler))
        .route("/route", post(route_handler));

    let mut router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .nest(API_PREFIX, api);

    if metrics.enabled {
        let path = if metrics.path.starts_with('/') {
            metrics.path.as_str()
        } else {
            warn!(path = %metrics.path, "METRICS_PATH must start with '/', using /metrics");
            "/metrics"
        };
        router = router.route(path, get(metrics_handler));
    }

    router
        .layer(service.cors_layer())
        .layer(MetricsLayer)
        .with_state(state)
}

/// Handle GET / requests.
async fn root_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Pathfinding API is running",
        "service": state.app_name(),
    }))
}

/// Handle GET /api/pathfinding/nodes requests.
///
/// The body is a bare JSON array of `{name, x, y}` so map clients can draw
/// it directly.
async fn nodes_handler(State(state): State<AppState>, request_id: RequestId) -> Response {
    match current_engine(&state, &request_id) {
        Ok(engine) => Json(engine.list_waypoints()).into_response(),
        Err(problem) => problem.into_response(),
    }
}

/// Handle POST /api/pathfinding/find-nearest-node requests.
async fn find_nearest_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<NearestRequest>, JsonRejection>,
) -> ApiResponse<NearestResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            record_nearest_query("invalid");
            return ApiResponse::Error(rejected(rejection, &request_id));
        }
    };

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_nearest_query("invalid");
        return ApiResponse::Error(*problem);
    }

    let engine = match current_engine(&state, &request_id) {
        Ok(engine) => engine,
        Err(problem) => {
            record_nearest_query("unavailable");
            return ApiResponse::Error(problem);
        }
    };

    let radius = request.radius();
    match engine.nearest_waypoint(request.point(), radius) {
        Some(found) => {
            record_nearest_query("found");
            info!(
                request_id = %request_id,
                x = request.x,
                y = request.y,
                node = %found.name,
                distance = found.distance,
                "nearest waypoint found"
            );
            ApiResponse::Success(ServiceResponse::new(NearestResponse::from(found)))
        }
        None => {
            record_nearest_query("none");
            info!(
                request_id = %request_id,
                x = request.x,
                y = request.y,
                radius = ?radius,
                "no waypoint within radius"
            );
            ApiResponse::Success(ServiceResponse::new(NearestResponse::absent()))
        }
    }
}

/// Handle POST /api/pathfinding/find-path requests.
async fn find_path_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<PathRequest>, JsonRejection>,
) -> ApiResponse<PathResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            record_path_failed("validation_error", FIND_PATH);
            return ApiResponse::Error(rejected(rejection, &request_id));
        }
    };

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_path_failed("validation_error", FIND_PATH);
        return ApiResponse::Error(*problem);
    }

    let engine = match current_engine(&state, &request_id) {
        Ok(engine) => engine,
        Err(problem) => {
            record_path_failed("unavailable", FIND_PATH);
            return ApiResponse::Error(problem);
        }
    };
    let algorithm = engine.config().search.algorithm.to_string();

    match engine.find_path_between_points(request.start(), request.end()) {
        Ok(PointRoute::Found(path)) => path_found(path, &algorithm, FIND_PATH, &request_id),
        Ok(PointRoute::NoNearbyWaypoint { endpoint, point }) => {
            record_path_failed("no_nearby_waypoint", FIND_PATH);
            info!(request_id = %request_id, endpoint = %endpoint, "no waypoint near clicked point");
            ApiResponse::Error(ProblemDetails::no_nearby_waypoint(
                format!(
                    "No waypoint near the {} point ({}, {})",
                    endpoint, point.x, point.y
                ),
                request_id.as_str(),
            ))
        }
        Ok(PointRoute::NoPath { start, goal }) => {
            record_path_failed("no_path", FIND_PATH);
            info!(request_id = %request_id, start = %start, goal = %goal, "no path between snapped waypoints");
            ApiResponse::Error(ProblemDetails::path_not_found(
                &start,
                &goal,
                request_id.as_str(),
            ))
        }
        Err(e) => {
            record_path_failed(failure_reason(&e), FIND_PATH);
            ApiResponse::Error(from_lib_error(&e, request_id.as_str()))
        }
    }
}

/// Handle POST /api/pathfinding/route requests.
async fn route_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<NamedRouteRequest>, JsonRejection>,
) -> ApiResponse<PathResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            record_path_failed("validation_error", ROUTE);
            return ApiResponse::Error(rejected(rejection, &request_id));
        }
    };

    info!(
        request_id = %request_id,
        from = %request.from,
        to = %request.to,
        "handling route request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_path_failed("validation_error", ROUTE);
        return ApiResponse::Error(*problem);
    }

    let engine = match current_engine(&state, &request_id) {
        Ok(engine) => engine,
        Err(problem) => {
            record_path_failed("unavailable", ROUTE);
            return ApiResponse::Error(problem);
        }
    };
    let algorithm = engine.config().search.algorithm.to_string();

    match engine.route_by_name(&request.from, &request.to) {
        Ok(path) => path_found(path, &algorithm, ROUTE, &request_id),
        Err(e) => {
            info!(request_id = %request_id, error = %e, "route not computed");
            record_path_failed(failure_reason(&e), ROUTE);
            ApiResponse::Error(from_lib_error(&e, request_id.as_str()))
        }
    }
}

fn path_found(
    path: Path,
    algorithm: &str,
    endpoint: &str,
    request_id: &RequestId,
) -> ApiResponse<PathResponse> {
    let response = PathResponse::from(path);

    record_path_found(algorithm, endpoint);
    record_path_hops(response.hops, algorithm);

    info!(
        request_id = %request_id,
        endpoint,
        hops = response.hops,
        total_distance = response.total_distance,
        "path computed successfully"
    );

    ApiResponse::Success(ServiceResponse::new(response))
}

fn current_engine(state: &AppState, request_id: &RequestId) -> Result<Arc<Engine>, ProblemDetails> {
    state.engine().map_err(|reason| {
        warn!(request_id = %request_id, reason = %reason, "map engine unavailable");
        ProblemDetails::service_unavailable(
            format!("Map engine is not loaded: {}", reason),
            request_id.as_str(),
        )
    })
}

fn rejected(rejection: JsonRejection, request_id: &RequestId) -> ProblemDetails {
    ProblemDetails::bad_request(rejection.body_text(), request_id.as_str())
}

fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::UnknownWaypoint { .. } => "unknown_waypoint",
        LibError::PathNotFound { .. } => "no_path",
        LibError::NoNearbyWaypoint { .. } => "no_nearby_waypoint",
        LibError::InvalidInput { .. } => "validation_error",
        other => {
            error!(error = %other, "unexpected engine error");
            "internal_error"
        }
    }
}
