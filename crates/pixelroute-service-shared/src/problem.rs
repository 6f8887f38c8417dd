//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use pixelroute_lib::Error as LibError;

/// Problem type URI for waypoint names that do not exist.
pub const PROBLEM_UNKNOWN_WAYPOINT: &str = "/problems/unknown-waypoint";

/// Problem type URI for points with no waypoint inside the search radius.
pub const PROBLEM_NO_NEARBY_WAYPOINT: &str = "/problems/no-nearby-waypoint";

/// Problem type URI for waypoints that are not connected.
pub const PROBLEM_PATH_NOT_FOUND: &str = "/problems/path-not-found";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for service unavailable (engine not loaded).
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use pixelroute_service_shared::{ProblemDetails, PROBLEM_UNKNOWN_WAYPOINT};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_UNKNOWN_WAYPOINT,
///     "Unknown Waypoint",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("Waypoint 'Libary' not found. Did you mean: Library?")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (the request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for unknown waypoint names.
    pub fn unknown_waypoint(
        name: &str,
        suggestions: &[String],
        request_id: impl Into<String>,
    ) -> Self {
        let detail = if suggestions.is_empty() {
            format!("Waypoint '{}' not found", name)
        } else {
            format!(
                "Waypoint '{}' not found. Did you mean: {}?",
                name,
                suggestions.join(", ")
            )
        };

        Self::new(
            PROBLEM_UNKNOWN_WAYPOINT,
            "Unknown Waypoint",
            StatusCode::NOT_FOUND,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found when a clicked point is too far from every waypoint.
    pub fn no_nearby_waypoint(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_NO_NEARBY_WAYPOINT,
            "No Nearby Waypoint",
            StatusCode::NOT_FOUND,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for waypoints with no directed path between them.
    pub fn path_not_found(start: &str, goal: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_PATH_NOT_FOUND,
            "Path Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("No path exists from '{}' to '{}'", start, goal))
        .with_request_id(request_id)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 503 Service Unavailable.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownWaypoint { name, suggestions } => {
            ProblemDetails::unknown_waypoint(name, suggestions, request_id)
        }
        LibError::PathNotFound { start, goal } => {
            ProblemDetails::path_not_found(start, goal, request_id)
        }
        LibError::NoNearbyWaypoint { .. } => {
            ProblemDetails::no_nearby_waypoint(error.to_string(), request_id)
        }
        LibError::InvalidInput { message } => ProblemDetails::bad_request(message, request_id),
        LibError::DatasetNotFound { path } => ProblemDetails::service_unavailable(
            format!("Dataset not available at {}", path.display()),
            request_id,
        ),
        LibError::UnsupportedSchema => {
            ProblemDetails::internal_error("Unsupported dataset schema", request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}
