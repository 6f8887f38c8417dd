use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coords::{CoordinateSpace, Point};
use crate::dataset::{Dataset, EdgeRecord, NodeRecord};
use crate::error::{Error, Result};

/// Dense index of a waypoint inside a [`Graph`]; assigned in load order.
pub type WaypointId = usize;

/// Named point on the map, in canonical coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Waypoint {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Outgoing edge stored in the adjacency list of its source waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: WaypointId,
    pub weight: f64,
}

/// What to do when two node records share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Abort the build with [`Error::DuplicateWaypoint`].
    #[default]
    Reject,
    /// Keep the first record, warn about the rest.
    KeepFirst,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DuplicatePolicy::Reject => "reject",
            DuplicatePolicy::KeepFirst => "keep-first",
        };
        f.write_str(value)
    }
}

impl FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "keep-first" | "keep_first" => Ok(DuplicatePolicy::KeepFirst),
            other => Err(Error::invalid_config(
                "PIXELROUTE_DUPLICATES",
                format!("expected 'reject' or 'keep-first', got '{other}'"),
            )),
        }
    }
}

/// Counts gathered while building a graph.
///
/// Every skipped record is a data-integrity warning: it is logged and
/// counted, never fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub waypoints: usize,
    pub edges: usize,
    pub duplicate_waypoints: usize,
    pub invalid_waypoints: usize,
    pub unknown_endpoint_edges: usize,
    pub invalid_weight_edges: usize,
    pub replaced_edges: usize,
}

/// Immutable directed weighted graph of waypoints.
///
/// Cloning is cheap: the storage sits behind an `Arc` and is never mutated
/// after [`Graph::build`] returns.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: Arc<GraphInner>,
}

#[derive(Debug, Default)]
struct GraphInner {
    waypoints: Vec<Waypoint>,
    name_to_id: HashMap<String, WaypointId>,
    adjacency: Vec<Vec<Edge>>,
    summary: LoadSummary,
}

impl Graph {
    /// Build a graph from raw records, normalizing every waypoint once.
    pub fn build(dataset: &Dataset, space: &CoordinateSpace, policy: DuplicatePolicy) -> Result<Self> {
        let mut summary = LoadSummary::default();
        let (waypoints, name_to_id) = register_waypoints(&dataset.nodes, space, policy, &mut summary)?;
        let adjacency = connect_edges(&dataset.edges, &name_to_id, &mut summary);

        summary.waypoints = waypoints.len();
        summary.edges = adjacency.iter().map(Vec::len).sum();
        debug!(
            waypoints = summary.waypoints,
            edges = summary.edges,
            origin = %space.origin(),
            "built waypoint graph"
        );

        Ok(Self {
            inner: Arc::new(GraphInner {
                waypoints,
                name_to_id,
                adjacency,
                summary,
            }),
        })
    }

    /// Waypoints in load order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.inner.waypoints
    }

    pub fn waypoint(&self, id: WaypointId) -> Option<&Waypoint> {
        self.inner.waypoints.get(id)
    }

    pub fn id_of(&self, name: &str) -> Option<WaypointId> {
        self.inner.name_to_id.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.name_to_id.contains_key(name)
    }

    pub fn waypoint_count(&self) -> usize {
        self.inner.waypoints.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.summary.edges
    }

    pub fn is_empty(&self) -> bool {
        self.inner.waypoints.is_empty()
    }

    pub fn summary(&self) -> LoadSummary {
        self.inner.summary
    }

    /// Outgoing edges of a waypoint; empty for unknown ids.
    pub fn neighbours(&self, id: WaypointId) -> &[Edge] {
        self.inner
            .adjacency
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outgoing `(target name, weight)` pairs for a waypoint name.
    pub fn outgoing(&self, name: &str) -> Vec<(&str, f64)> {
        let Some(id) = self.id_of(name) else {
            return Vec::new();
        };
        self.neighbours(id)
            .iter()
            .map(|edge| (self.inner.waypoints[edge.target].name.as_str(), edge.weight))
            .collect()
    }

    /// Up to `limit` waypoint names close to `name` by Jaro-Winkler similarity.
    pub fn fuzzy_waypoint_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .inner
            .waypoints
            .iter()
            .map(|waypoint| {
                let score = strsim::jaro_winkler(&needle, &waypoint.name.to_lowercase());
                (score, waypoint.name.as_str())
            })
            .filter(|(score, _)| *score >= 0.8)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

fn register_waypoints(
    records: &[NodeRecord],
    space: &CoordinateSpace,
    policy: DuplicatePolicy,
    summary: &mut LoadSummary,
) -> Result<(Vec<Waypoint>, HashMap<String, WaypointId>)> {
    let mut waypoints = Vec::with_capacity(records.len());
    let mut name_to_id = HashMap::with_capacity(records.len());

    for record in records {
        if record.name.trim().is_empty() || !record.x.is_finite() || !record.y.is_finite() {
            summary.invalid_waypoints += 1;
            continue;
        }

        match name_to_id.entry(record.name.clone()) {
            Entry::Occupied(_) => match policy {
                DuplicatePolicy::Reject => {
                    return Err(Error::DuplicateWaypoint {
                        name: record.name.clone(),
                    });
                }
                DuplicatePolicy::KeepFirst => {
                    warn!(name = %record.name, "ignoring duplicate waypoint record");
                    summary.duplicate_waypoints += 1;
                }
            },
            Entry::Vacant(slot) => {
                let position = space.normalize(record.x, record.y);
                slot.insert(waypoints.len());
                waypoints.push(Waypoint {
                    name: record.name.clone(),
                    x: position.x,
                    y: position.y,
                });
            }
        }
    }

    if summary.invalid_waypoints > 0 {
        warn!(
            invalid_waypoints = summary.invalid_waypoints,
            "ignored waypoint records with empty names or non-finite coordinates",
        );
    }

    Ok((waypoints, name_to_id))
}

fn connect_edges(
    records: &[EdgeRecord],
    name_to_id: &HashMap<String, WaypointId>,
    summary: &mut LoadSummary,
) -> Vec<Vec<Edge>> {
    let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); name_to_id.len()];
    // Position of each ordered pair inside its source's adjacency list.
    let mut slots: HashMap<(WaypointId, WaypointId), usize> = HashMap::new();

    for record in records {
        let (Some(&from), Some(&to)) = (name_to_id.get(&record.from), name_to_id.get(&record.to))
        else {
            summary.unknown_endpoint_edges += 1;
            continue;
        };
        if !record.weight.is_finite() || record.weight <= 0.0 {
            summary.invalid_weight_edges += 1;
            continue;
        }

        let edge = Edge {
            target: to,
            weight: record.weight,
        };
        match slots.entry((from, to)) {
            Entry::Occupied(slot) => {
                adjacency[from][*slot.get()] = edge;
                summary.replaced_edges += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(adjacency[from].len());
                adjacency[from].push(edge);
            }
        }
    }

    if summary.unknown_endpoint_edges > 0 {
        warn!(
            skipped_edges = summary.unknown_endpoint_edges,
            "ignored edges referencing unknown waypoints",
        );
    }
    if summary.invalid_weight_edges > 0 {
        warn!(
            skipped_edges = summary.invalid_weight_edges,
            "ignored edges with non-positive or non-finite weights",
        );
    }
    if summary.replaced_edges > 0 {
        warn!(
            replaced_edges = summary.replaced_edges,
            "repeated edges replaced by their last record",
        );
    }

    adjacency
}
