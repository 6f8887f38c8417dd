//! Output formatting for CLI results.
//!
//! Text output is meant for people; JSON output mirrors the HTTP service
//! bodies so scripts can switch between the two.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use pixelroute_lib::{NearestWaypoint, Path, SearchAlgorithm, Waypoint};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// JSON shape of a computed path.
#[derive(Debug, Serialize)]
pub struct PathReport<'a> {
    #[serde(flatten)]
    pub path: &'a Path,
    pub hops: usize,
    pub algorithm: SearchAlgorithm,
}

impl<'a> PathReport<'a> {
    pub fn new(path: &'a Path, algorithm: SearchAlgorithm) -> Self {
        Self {
            path,
            hops: path.hop_count(),
            algorithm,
        }
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output as JSON")
}

pub fn render_waypoints(waypoints: &[Waypoint]) -> String {
    let mut out = format!("{} waypoints:\n", waypoints.len());
    for waypoint in waypoints {
        out.push_str(&format!(
            "- {} ({}, {})\n",
            waypoint.name, waypoint.x, waypoint.y
        ));
    }
    out
}

pub fn render_nearest(found: &NearestWaypoint) -> String {
    format!(
        "Nearest waypoint: {} ({}, {}), distance {:.2}\n",
        found.name, found.x, found.y, found.distance
    )
}

/// Render a path as one line per waypoint followed by the total cost.
pub fn render_path(path: &Path, algorithm: SearchAlgorithm) -> String {
    let start = path.waypoints.first().map(String::as_str).unwrap_or("<none>");
    let goal = path.waypoints.last().map(String::as_str).unwrap_or("<none>");
    let mut out = format!(
        "Path from {} to {} ({} hops; algorithm: {}):\n",
        start,
        goal,
        path.hop_count(),
        algorithm
    );
    for (name, [x, y]) in path.waypoints.iter().zip(&path.coordinates) {
        out.push_str(&format!("- {} ({}, {})\n", name, x, y));
    }
    out.push_str(&format!("\nTotal distance: {:.2}\n", path.total_cost));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> Path {
        Path {
            waypoints: vec!["Gate".to_string(), "Library".to_string()],
            coordinates: vec![[100.0, 100.0], [400.0, 100.0]],
            total_cost: 3.0,
        }
    }

    #[test]
    fn renders_waypoint_list() {
        let waypoints = vec![Waypoint {
            name: "Gate".to_string(),
            x: 100.0,
            y: 100.5,
        }];
        let text = render_waypoints(&waypoints);
        assert!(text.starts_with("1 waypoints:"));
        assert!(text.contains("- Gate (100, 100.5)"));
    }

    #[test]
    fn renders_path_text() {
        let text = render_path(&sample_path(), SearchAlgorithm::AStar);
        assert!(text.contains("Path from Gate to Library (1 hops; algorithm: a-star)"));
        assert!(text.contains("- Library (400, 100)"));
        assert!(text.contains("Total distance: 3.00"));
    }

    #[test]
    fn path_json_flattens_path_fields() {
        let path = sample_path();
        let json = to_json(&PathReport::new(&path, SearchAlgorithm::Dijkstra)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["path"], serde_json::json!(["Gate", "Library"]));
        assert_eq!(value["total_distance"], 3.0);
        assert_eq!(value["hops"], 1);
        assert_eq!(value["algorithm"], "dijkstra");
    }

    #[test]
    fn renders_nearest() {
        let found = NearestWaypoint {
            name: "Lab".to_string(),
            x: 700.0,
            y: 400.0,
            distance: 0.123,
        };
        assert_eq!(
            render_nearest(&found),
            "Nearest waypoint: Lab (700, 400), distance 0.12\n"
        );
    }
}
