//! The query facade shared by the HTTP service and the CLI.
//!
//! An [`Engine`] owns one immutable [`Graph`] plus its [`WaypointIndex`].
//! Every query takes `&self` and allocates only request-local state, so one
//! engine can be shared across threads behind an `Arc`. Picking up new data
//! means building a fresh engine and swapping it in.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::coords::Point;
use crate::dataset::{DataSource, Dataset};
use crate::error::{Error, Result};
use crate::graph::{Graph, LoadSummary, Waypoint};
use crate::path::{find_path, Path};
use crate::spatial::{SearchRadius, WaypointIndex};

/// Radius used to snap the endpoints of a point-to-point route.
pub const SNAP_RADIUS: SearchRadius = SearchRadius::Within(crate::spatial::DEFAULT_MAX_DISTANCE);

const MAX_SUGGESTIONS: usize = 3;

/// A waypoint returned by a nearest lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestWaypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Distance from the query point in scaled units.
    pub distance: f64,
}

/// Which end of a point-to-point request failed to snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Start,
    End,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// Outcome of [`Engine::find_path_between_points`].
#[derive(Debug, Clone, PartialEq)]
pub enum PointRoute {
    Found(Path),
    /// One of the points has no waypoint within [`SNAP_RADIUS`].
    NoNearbyWaypoint { endpoint: Endpoint, point: Point },
    /// Both points snapped but the waypoints are not connected.
    NoPath { start: String, goal: String },
}

impl PointRoute {
    /// Convert the miss outcomes into library errors.
    pub fn into_result(self) -> Result<Path> {
        match self {
            PointRoute::Found(path) => Ok(path),
            PointRoute::NoNearbyWaypoint { point, .. } => Err(Error::NoNearbyWaypoint {
                x: point.x,
                y: point.y,
            }),
            PointRoute::NoPath { start, goal } => Err(Error::PathNotFound { start, goal }),
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    graph: Graph,
    index: WaypointIndex,
    config: EngineConfig,
    source: String,
}

impl Engine {
    /// Load records from `source` and build the graph and index.
    pub fn build(source: &dyn DataSource, config: &EngineConfig) -> Result<Self> {
        let dataset = source.load()?;
        Self::assemble(&dataset, config, source.describe())
    }

    pub fn from_dataset(dataset: &Dataset, config: &EngineConfig) -> Result<Self> {
        Self::assemble(dataset, config, dataset.describe())
    }

    fn assemble(dataset: &Dataset, config: &EngineConfig, source: String) -> Result<Self> {
        let space = config.map.coordinate_space();
        let graph = Graph::build(dataset, &space, config.duplicates)?;
        let index = WaypointIndex::build(&graph, config.nearest);
        debug!(
            origin = %space.origin(),
            map_height = ?space.map_height(),
            flipped = !space.is_identity(),
            indexed = index.len(),
            "coordinate frame resolved"
        );

        let summary = graph.summary();
        info!(
            source = %source,
            waypoints = summary.waypoints,
            edges = summary.edges,
            nearest = %config.nearest,
            algorithm = %config.search.algorithm,
            "map engine ready"
        );

        Ok(Self {
            graph,
            index,
            config: *config,
            source,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Label of the source the engine was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn summary(&self) -> LoadSummary {
        self.graph.summary()
    }

    /// Every waypoint in load order, in canonical coordinates.
    pub fn list_waypoints(&self) -> &[Waypoint] {
        self.graph.waypoints()
    }

    pub fn nearest_waypoint(&self, point: Point, radius: SearchRadius) -> Option<NearestWaypoint> {
        let found = self.index.nearest(point, radius)?;
        let waypoint = self.graph.waypoint(found.id)?;
        Some(NearestWaypoint {
            name: waypoint.name.clone(),
            x: waypoint.x,
            y: waypoint.y,
            distance: found.distance,
        })
    }

    /// Cheapest route between two waypoint names; `None` for unknown names
    /// or unreachable goals.
    pub fn find_path(&self, start: &str, goal: &str) -> Option<Path> {
        find_path(&self.graph, start, goal, &self.config.search)
    }

    /// Like [`find_path`](Self::find_path) but reports why no route came
    /// back, with suggestions for misspelled names.
    pub fn route_by_name(&self, start: &str, goal: &str) -> Result<Path> {
        let start = validate_name("from", start)?;
        let goal = validate_name("to", goal)?;
        for name in [start, goal] {
            if !self.graph.contains(name) {
                return Err(Error::UnknownWaypoint {
                    name: name.to_string(),
                    suggestions: self.graph.fuzzy_waypoint_matches(name, MAX_SUGGESTIONS),
                });
            }
        }
        self.find_path(start, goal).ok_or_else(|| Error::PathNotFound {
            start: start.to_string(),
            goal: goal.to_string(),
        })
    }

    /// Snap both points to their nearest waypoints and route between them.
    ///
    /// Non-finite coordinates are rejected with [`Error::InvalidInput`];
    /// every other miss is a [`PointRoute`] outcome.
    pub fn find_path_between_points(&self, start: Point, end: Point) -> Result<PointRoute> {
        validate_point("start", start)?;
        validate_point("end", end)?;

        let Some(from) = self.nearest_waypoint(start, SNAP_RADIUS) else {
            return Ok(PointRoute::NoNearbyWaypoint {
                endpoint: Endpoint::Start,
                point: start,
            });
        };
        let Some(to) = self.nearest_waypoint(end, SNAP_RADIUS) else {
            return Ok(PointRoute::NoNearbyWaypoint {
                endpoint: Endpoint::End,
                point: end,
            });
        };

        Ok(match self.find_path(&from.name, &to.name) {
            Some(path) => PointRoute::Found(path),
            None => PointRoute::NoPath {
                start: from.name,
                goal: to.name,
            },
        })
    }
}

/// Reject non-finite coordinates before they reach the engine.
pub fn validate_point(label: &str, point: Point) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidInput {
            message: format!("{label} coordinates must be finite numbers"),
        })
    }
}

/// Reject non-positive or non-finite search radii.
pub fn validate_radius(radius: SearchRadius) -> Result<()> {
    match radius {
        SearchRadius::Within(limit) if !(limit.is_finite() && limit > 0.0) => {
            Err(Error::InvalidInput {
                message: format!("max_distance must be a positive number, got {limit}"),
            })
        }
        _ => Ok(()),
    }
}

/// Names are matched exactly as stored, surrounding spaces included.
fn validate_name<'a>(label: &str, name: &'a str) -> Result<&'a str> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: format!("{label} must not be empty"),
        });
    }
    Ok(name)
}
