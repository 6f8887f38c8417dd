//! Nearest-waypoint lookup for arbitrary pixel positions.
//!
//! Distances are measured in scaled units (pixels / [`SCALE_DIVISOR`]) so the
//! search radius can be compared with edge weights. A waypoint only matches
//! when its distance is strictly below the radius.
//!
//! Two strategies are available:
//!
//! - [`NearestStrategy::Linear`] scans every waypoint. Ties resolve to the
//!   first waypoint in load order. This is the default and is plenty for
//!   maps with a few thousand waypoints.
//! - [`NearestStrategy::KdTree`] answers from a k-d tree built once with the
//!   engine. Same radius contract; which of several equidistant waypoints
//!   wins is unspecified.
//!
//! [`SCALE_DIVISOR`]: crate::coords::SCALE_DIVISOR

use std::fmt;
use std::str::FromStr;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::{Point, SCALE_DIVISOR};
use crate::error::{Error, Result};
use crate::graph::{Graph, WaypointId};

/// Default radius, in scaled units, for capped lookups.
pub const DEFAULT_MAX_DISTANCE: f64 = 100.0;

/// KD-tree bucket size. Must exceed the number of waypoints sharing a single
/// x or y value, which kiddo cannot split.
const BUCKET_SIZE: usize = 256;

/// How far from the query point a waypoint may be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchRadius {
    /// Only waypoints strictly closer than this many scaled units.
    Within(f64),
    /// Any waypoint; used for discovery where every click should resolve.
    Unbounded,
}

impl SearchRadius {
    fn admits(&self, distance: f64) -> bool {
        match self {
            SearchRadius::Within(limit) => distance < *limit,
            SearchRadius::Unbounded => true,
        }
    }

    fn initial_bound(&self) -> f64 {
        match self {
            SearchRadius::Within(limit) => *limit,
            SearchRadius::Unbounded => f64::INFINITY,
        }
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        SearchRadius::Within(DEFAULT_MAX_DISTANCE)
    }
}

impl From<Option<f64>> for SearchRadius {
    fn from(value: Option<f64>) -> Self {
        value.map(SearchRadius::Within).unwrap_or(SearchRadius::Unbounded)
    }
}

/// Lookup strategy used by [`WaypointIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NearestStrategy {
    #[default]
    Linear,
    KdTree,
}

impl fmt::Display for NearestStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            NearestStrategy::Linear => "linear",
            NearestStrategy::KdTree => "kdtree",
        };
        f.write_str(value)
    }
}

impl FromStr for NearestStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(NearestStrategy::Linear),
            "kdtree" | "kd-tree" => Ok(NearestStrategy::KdTree),
            other => Err(Error::invalid_config(
                "PIXELROUTE_NEAREST_INDEX",
                format!("expected 'linear' or 'kdtree', got '{other}'"),
            )),
        }
    }
}

/// A waypoint matched by a nearest lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch {
    pub id: WaypointId,
    /// Distance from the query point in scaled units.
    pub distance: f64,
}

/// Read-only index over the waypoint positions of one [`Graph`].
pub struct WaypointIndex {
    positions: Vec<Point>,
    tree: Option<KdTree<f64, usize, 2, BUCKET_SIZE, u32>>,
}

impl WaypointIndex {
    pub fn build(graph: &Graph, strategy: NearestStrategy) -> Self {
        let positions: Vec<Point> = graph.waypoints().iter().map(|w| w.position()).collect();

        let tree = match strategy {
            NearestStrategy::Linear => None,
            NearestStrategy::KdTree => {
                let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
                for (index, position) in positions.iter().enumerate() {
                    tree.add(&position.as_array(), index);
                }
                debug!(node_count = positions.len(), "built waypoint k-d tree");
                Some(tree)
            }
        };

        Self { positions, tree }
    }

    pub fn strategy(&self) -> NearestStrategy {
        if self.tree.is_some() {
            NearestStrategy::KdTree
        } else {
            NearestStrategy::Linear
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Closest waypoint to `point` admitted by `radius`, if any.
    pub fn nearest(&self, point: Point, radius: SearchRadius) -> Option<NearestMatch> {
        if self.is_empty() || !point.is_finite() {
            return None;
        }

        match &self.tree {
            Some(tree) => {
                let found = tree.nearest_one::<SquaredEuclidean>(&point.as_array());
                let distance = found.distance.sqrt() / SCALE_DIVISOR;
                radius.admits(distance).then_some(NearestMatch {
                    id: found.item,
                    distance,
                })
            }
            None => self.scan(point, radius),
        }
    }

    fn scan(&self, point: Point, radius: SearchRadius) -> Option<NearestMatch> {
        let mut best: Option<NearestMatch> = None;
        let mut bound = radius.initial_bound();
        for (id, position) in self.positions.iter().enumerate() {
            let distance = position.scaled_distance(&point);
            if distance < bound {
                bound = distance;
                best = Some(NearestMatch { id, distance });
            }
        }
        best
    }
}

impl fmt::Debug for WaypointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaypointIndex")
            .field("waypoints", &self.positions.len())
            .field("strategy", &self.strategy())
            .finish()
    }
}
