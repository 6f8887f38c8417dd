use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Graph, WaypointId};

/// Search algorithms supported by [`find_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchAlgorithm {
    /// A* guided by the scaled straight-line distance to the goal.
    ///
    /// Optimal only while no edge weight undercuts the scaled straight-line
    /// distance between its endpoints.
    #[default]
    AStar,
    /// Dijkstra's algorithm; always optimal for positive weights.
    Dijkstra,
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SearchAlgorithm::AStar => "a-star",
            SearchAlgorithm::Dijkstra => "dijkstra",
        };
        f.write_str(value)
    }
}

impl FromStr for SearchAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a-star" | "astar" | "a*" => Ok(SearchAlgorithm::AStar),
            "dijkstra" => Ok(SearchAlgorithm::Dijkstra),
            other => Err(Error::invalid_config(
                "PIXELROUTE_ALGORITHM",
                format!("expected 'a-star' or 'dijkstra', got '{other}'"),
            )),
        }
    }
}

/// Options applied to a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub algorithm: SearchAlgorithm,
    /// Give up after settling this many waypoints.
    pub max_expansions: Option<usize>,
}

impl SearchOptions {
    pub fn dijkstra() -> Self {
        Self {
            algorithm: SearchAlgorithm::Dijkstra,
            ..Self::default()
        }
    }
}

/// Route between two waypoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    /// Waypoint names from start to goal, inclusive.
    #[serde(rename = "path")]
    pub waypoints: Vec<String>,
    /// Canonical `[x, y]` of each waypoint in `waypoints`.
    pub coordinates: Vec<[f64; 2]>,
    /// Sum of the traversed edge weights.
    #[serde(rename = "total_distance")]
    pub total_cost: f64,
}

impl Path {
    pub fn hop_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }
}

/// Find the cheapest directed path from `start` to `goal`.
///
/// Returns `None` when either name is unknown, when the goal is unreachable,
/// or when the search exceeds `options.max_expansions`.
pub fn find_path(graph: &Graph, start: &str, goal: &str, options: &SearchOptions) -> Option<Path> {
    let start_id = graph.id_of(start)?;
    let goal_id = graph.id_of(goal)?;

    let (route, cost) = search(graph, start_id, goal_id, options)?;
    Some(materialize(graph, &route, cost))
}

fn search(
    graph: &Graph,
    start: WaypointId,
    goal: WaypointId,
    options: &SearchOptions,
) -> Option<(Vec<WaypointId>, f64)> {
    if start == goal {
        return Some((vec![start], 0.0));
    }

    let mut g_score: HashMap<WaypointId, f64> = HashMap::new();
    let mut parents: HashMap<WaypointId, Option<WaypointId>> = HashMap::new();
    let mut queue = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut expansions = 0usize;

    g_score.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(FrontierEntry::new(
        start,
        0.0,
        heuristic(graph, start, goal, options.algorithm),
        sequence,
    ));

    while let Some(entry) = queue.pop() {
        let current_score = match g_score.get(&entry.node) {
            Some(score) if *score < entry.cost.0 => continue,
            Some(score) => *score,
            None => continue,
        };

        if entry.node == goal {
            let route = reconstruct_path(&parents, start, goal);
            return Some((route, current_score));
        }

        expansions += 1;
        if let Some(limit) = options.max_expansions {
            if expansions > limit {
                debug!(limit, "path search exceeded expansion limit");
                return None;
            }
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            let tentative = current_score + edge.weight;
            if tentative < *g_score.get(&next).unwrap_or(&f64::INFINITY) {
                g_score.insert(next, tentative);
                parents.insert(next, Some(entry.node));
                sequence += 1;
                let estimate = heuristic(graph, next, goal, options.algorithm);
                queue.push(FrontierEntry::new(next, tentative, estimate, sequence));
            }
        }
    }

    None
}

fn heuristic(graph: &Graph, from: WaypointId, to: WaypointId, algorithm: SearchAlgorithm) -> f64 {
    if algorithm == SearchAlgorithm::Dijkstra {
        return 0.0;
    }
    match (graph.waypoint(from), graph.waypoint(to)) {
        (Some(a), Some(b)) => a.position().scaled_distance(&b.position()),
        _ => 0.0,
    }
}

fn reconstruct_path(
    parents: &HashMap<WaypointId, Option<WaypointId>>,
    start: WaypointId,
    goal: WaypointId,
) -> Vec<WaypointId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

fn materialize(graph: &Graph, route: &[WaypointId], total_cost: f64) -> Path {
    let mut waypoints = Vec::with_capacity(route.len());
    let mut coordinates = Vec::with_capacity(route.len());
    for waypoint in route.iter().filter_map(|&id| graph.waypoint(id)) {
        waypoints.push(waypoint.name.clone());
        coordinates.push([waypoint.x, waypoint.y]);
    }
    Path {
        waypoints,
        coordinates,
        total_cost,
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct FrontierEntry {
    node: WaypointId,
    cost: FloatOrd,
    estimate: FloatOrd,
    sequence: u64,
}

impl FrontierEntry {
    fn new(node: WaypointId, cost: f64, heuristic: f64, sequence: u64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
            sequence,
        }
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest estimate, then the oldest entry.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
