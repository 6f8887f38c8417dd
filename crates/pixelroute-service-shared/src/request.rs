//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use pixelroute_lib::{Point, SearchRadius};

use crate::ProblemDetails;

/// Radius, in scaled units, used by `find-nearest-node` when the caller
/// does not pass `max_distance`.
pub const NEAREST_ENDPOINT_MAX_DISTANCE: f64 = 150.0;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Pixel position clicked on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestRequest {
    pub x: f64,
    pub y: f64,

    /// Search radius in scaled units (pixels / 100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,

    /// Ignore the radius and always return the closest waypoint.
    #[serde(default)]
    pub unbounded: bool,
}

impl NearestRequest {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn radius(&self) -> SearchRadius {
        if self.unbounded {
            SearchRadius::Unbounded
        } else {
            SearchRadius::Within(self.max_distance.unwrap_or(NEAREST_ENDPOINT_MAX_DISTANCE))
        }
    }
}

impl Validate for NearestRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'x' and 'y' fields must be finite numbers",
                request_id,
            )));
        }

        if let Some(max_distance) = self.max_distance {
            if !max_distance.is_finite() || max_distance <= 0.0 {
                return Err(Box::new(ProblemDetails::bad_request(
                    "The 'max_distance' field must be a positive number",
                    request_id,
                )));
            }
            if self.unbounded {
                return Err(Box::new(ProblemDetails::bad_request(
                    "The 'max_distance' and 'unbounded' fields cannot be combined",
                    request_id,
                )));
            }
        }

        Ok(())
    }
}

/// Two clicked points to route between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequest {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl PathRequest {
    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }
}

impl Validate for PathRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if !self.start().is_finite() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'start_x' and 'start_y' fields must be finite numbers",
                request_id,
            )));
        }

        if !self.end().is_finite() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'end_x' and 'end_y' fields must be finite numbers",
                request_id,
            )));
        }

        Ok(())
    }
}

/// Route between two waypoint names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRouteRequest {
    /// Starting waypoint name.
    pub from: String,

    /// Destination waypoint name.
    pub to: String,
}

impl Validate for NamedRouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.from.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'from' field is required and cannot be empty",
                request_id,
            )));
        }

        if self.to.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'to' field is required and cannot be empty",
                request_id,
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_request_defaults_to_endpoint_radius() {
        let req: NearestRequest = serde_json::from_str(r#"{"x":1.0,"y":2.0}"#).unwrap();
        assert!(req.validate("test").is_ok());
        assert_eq!(req.radius(), SearchRadius::Within(150.0));
        assert_eq!(req.point(), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_nearest_request_unbounded() {
        let req: NearestRequest =
            serde_json::from_str(r#"{"x":1.0,"y":2.0,"unbounded":true}"#).unwrap();
        assert_eq!(req.radius(), SearchRadius::Unbounded);
    }

    #[test]
    fn test_nearest_request_rejects_bad_radius() {
        let req = NearestRequest {
            x: 0.0,
            y: 0.0,
            max_distance: Some(-1.0),
            unbounded: false,
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'max_distance'"));

        let req = NearestRequest {
            max_distance: Some(5.0),
            unbounded: true,
            ..req
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("cannot be combined"));
    }

    #[test]
    fn test_nearest_request_rejects_non_finite() {
        let req = NearestRequest {
            x: f64::NAN,
            y: 0.0,
            max_distance: None,
            unbounded: false,
        };
        assert!(req.validate("test").is_err());
    }

    #[test]
    fn test_path_request_validation() {
        let req = PathRequest {
            start_x: 0.0,
            start_y: 0.0,
            end_x: f64::INFINITY,
            end_y: 1.0,
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'end_x'"));

        let req = PathRequest { end_x: 3.0, ..req };
        assert!(req.validate("test").is_ok());
        assert_eq!(req.end(), Point::new(3.0, 1.0));
    }

    #[test]
    fn test_named_route_request_empty_fields() {
        let req = NamedRouteRequest {
            from: "".to_string(),
            to: "Dorm".to_string(),
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'from'"));

        let req = NamedRouteRequest {
            from: "Gate".to_string(),
            to: "   ".to_string(),
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'to'"));
    }
}
