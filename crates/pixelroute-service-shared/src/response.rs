//! Response wrapper for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use pixelroute_lib::{NearestWaypoint, Path};

/// Wrapper for successful responses with content type metadata.
///
/// This provides symmetry with `ProblemDetails` by including content type
/// information in the response body. The payload must serialize as a JSON
/// object because its fields are flattened into the top level.
///
/// # Example
///
/// ```
/// use pixelroute_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Banner {
///     message: String,
/// }
///
/// let response = ServiceResponse::new(Banner { message: "running".into() });
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,

    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Body of a `find-nearest-node` call.
///
/// Every field is `null` when no waypoint lies within the search radius.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NearestResponse {
    /// Name of the closest waypoint.
    pub node: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Distance from the clicked point in scaled units.
    pub distance: Option<f64>,
}

impl NearestResponse {
    pub fn absent() -> Self {
        Self::default()
    }
}

impl From<NearestWaypoint> for NearestResponse {
    fn from(value: NearestWaypoint) -> Self {
        Self {
            node: Some(value.name),
            x: Some(value.x),
            y: Some(value.y),
            distance: Some(value.distance),
        }
    }
}

impl From<Option<NearestWaypoint>> for NearestResponse {
    fn from(value: Option<NearestWaypoint>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

/// Body of a successful `find-path` or `route` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathResponse {
    pub path: Vec<String>,
    /// `[x, y]` for each entry of `path`, canonical frame.
    pub coordinates: Vec<[f64; 2]>,
    pub total_distance: f64,
    pub hops: usize,
}

impl From<Path> for PathResponse {
    fn from(value: Path) -> Self {
        let hops = value.hop_count();
        Self {
            path: value.waypoints,
            coordinates: value.coordinates,
            total_distance: value.total_cost,
            hops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_flatten_serialization() {
        let response = ServiceResponse::new(NearestResponse {
            node: Some("Gate".to_string()),
            x: Some(100.0),
            y: Some(100.0),
            distance: Some(0.05),
        });
        let json = serde_json::to_string(&response).unwrap();

        // Fields should be at the top level, not nested under "data"
        assert!(json.contains("\"node\":\"Gate\""));
        assert!(json.contains("\"content_type\":\"application/json\""));
        assert!(!json.contains("\"data\":{"));
    }

    #[test]
    fn test_path_response_from_lib_path() {
        let path = Path {
            waypoints: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            coordinates: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            total_cost: 2.5,
        };
        let response = PathResponse::from(path);
        assert_eq!(response.hops, 2);
        assert_eq!(response.total_distance, 2.5);

        let json = serde_json::to_value(ServiceResponse::new(response)).unwrap();
        assert_eq!(json["path"], serde_json::json!(["A", "B", "C"]));
        assert_eq!(json["coordinates"][2], serde_json::json!([1.0, 1.0]));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"node":"Lab","x":1.0,"y":2.0,"distance":0.5,"content_type":"application/json"}"#;
        let response: ServiceResponse<NearestResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.node.as_deref(), Some("Lab"));
        assert_eq!(response.content_type, "application/json");
    }

    #[test]
    fn test_absent_nearest_serializes_nulls() {
        let response = NearestResponse::from(None);
        assert_eq!(response, NearestResponse::absent());

        let json = serde_json::to_value(ServiceResponse::new(response)).unwrap();
        assert!(json["node"].is_null());
        assert!(json["distance"].is_null());
        assert_eq!(json["content_type"], "application/json");
    }
}
