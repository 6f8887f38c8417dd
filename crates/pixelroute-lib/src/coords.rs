//! Canonical coordinate frame for map positions.
//!
//! Source datasets may store pixel coordinates with the origin at the
//! bottom-left corner of the map image. Everything downstream of loading
//! (nearest lookup, heuristics, API output) works in a single frame with the
//! origin at the top-left and `y` growing downward. [`CoordinateSpace`]
//! performs that conversion once per waypoint at load time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pixel-to-logical-unit ratio shared by nearest lookup and the path
/// heuristic so both stay comparable with stored edge weights.
pub const SCALE_DIVISOR: f64 = 100.0;

/// Position in the canonical (top-left origin) frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Raw Euclidean distance in pixels.
    pub fn pixel_distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Euclidean distance expressed in scaled units (pixels / 100).
    pub fn scaled_distance(&self, other: &Self) -> f64 {
        self.pixel_distance(other) / SCALE_DIVISOR
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Where the source data places its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Origin at the top-left corner; the canonical frame.
    #[default]
    TopLeft,
    /// Origin at the bottom-left corner; `y` is flipped on load.
    BottomLeft,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Origin::TopLeft => "top-left",
            Origin::BottomLeft => "bottom-left",
        };
        f.write_str(value)
    }
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top-left" | "top_left" | "topleft" => Ok(Origin::TopLeft),
            "bottom-left" | "bottom_left" | "bottomleft" => Ok(Origin::BottomLeft),
            other => Err(Error::invalid_config(
                "MAP_ORIGIN",
                format!("expected 'top-left' or 'bottom-left', got '{other}'"),
            )),
        }
    }
}

/// Converts raw stored coordinates into the canonical frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateSpace {
    map_height: Option<f64>,
    origin: Origin,
}

impl CoordinateSpace {
    /// Create a coordinate space for a map of the given height.
    ///
    /// A missing, non-finite, or non-positive height disables the flip so
    /// normalization degrades to the identity.
    pub fn new(map_height: Option<f64>, origin: Origin) -> Self {
        let map_height = map_height.filter(|h| h.is_finite() && *h > 0.0);
        Self { map_height, origin }
    }

    /// Identity space: data is already top-left.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn map_height(&self) -> Option<f64> {
        self.map_height
    }

    /// True when [`normalize`](Self::normalize) changes nothing.
    pub fn is_identity(&self) -> bool {
        self.origin == Origin::TopLeft || self.map_height.is_none()
    }

    pub fn normalize(&self, raw_x: f64, raw_y: f64) -> Point {
        match (self.origin, self.map_height) {
            (Origin::BottomLeft, Some(height)) => Point::new(raw_x, height - raw_y),
            _ => Point::new(raw_x, raw_y),
        }
    }
}
