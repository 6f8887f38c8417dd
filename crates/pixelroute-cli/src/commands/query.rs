//! Read-only map queries: waypoint listing, nearest lookup, and paths.

use anyhow::{bail, Result};

use pixelroute_cli::output::{
    render_nearest, render_path, render_waypoints, to_json, OutputFormat, PathReport,
};
use pixelroute_lib::{
    validate_point, validate_radius, Engine, Path, Point, PointRoute, SearchRadius,
    DEFAULT_MAX_DISTANCE, SNAP_RADIUS,
};

pub fn handle_nodes(engine: &Engine, format: OutputFormat) -> Result<()> {
    let waypoints = engine.list_waypoints();
    match format {
        OutputFormat::Text => print!("{}", render_waypoints(waypoints)),
        OutputFormat::Json => println!("{}", to_json(waypoints)?),
    }
    Ok(())
}

pub fn handle_nearest(
    engine: &Engine,
    x: f64,
    y: f64,
    max_distance: Option<f64>,
    unbounded: bool,
    format: OutputFormat,
) -> Result<()> {
    let point = Point::new(x, y);
    let radius = if unbounded {
        SearchRadius::Unbounded
    } else {
        SearchRadius::Within(max_distance.unwrap_or(DEFAULT_MAX_DISTANCE))
    };
    validate_point("query", point)?;
    validate_radius(radius)?;

    let Some(found) = engine.nearest_waypoint(point, radius) else {
        match radius {
            SearchRadius::Within(limit) => {
                bail!("no waypoint within {} units of ({}, {})", limit, x, y)
            }
            SearchRadius::Unbounded => bail!("the map has no waypoints"),
        }
    };

    match format {
        OutputFormat::Text => print!("{}", render_nearest(&found)),
        OutputFormat::Json => println!("{}", to_json(&found)?),
    }
    Ok(())
}

pub fn handle_route(engine: &Engine, from: &str, to: &str, format: OutputFormat) -> Result<()> {
    let path = engine.route_by_name(from, to)?;
    print_path(engine, &path, format)
}

pub fn handle_path(
    engine: &Engine,
    start: (f64, f64),
    end: (f64, f64),
    format: OutputFormat,
) -> Result<()> {
    let start = Point::new(start.0, start.1);
    let end = Point::new(end.0, end.1);

    match engine.find_path_between_points(start, end)? {
        PointRoute::Found(path) => print_path(engine, &path, format),
        PointRoute::NoNearbyWaypoint { endpoint, point } => {
            let limit = match SNAP_RADIUS {
                SearchRadius::Within(limit) => limit,
                SearchRadius::Unbounded => f64::INFINITY,
            };
            bail!(
                "no waypoint within {} units of the {} point ({}, {})",
                limit,
                endpoint,
                point.x,
                point.y
            )
        }
        PointRoute::NoPath { start, goal } => {
            bail!("no path from '{}' to '{}'", start, goal)
        }
    }
}

fn print_path(engine: &Engine, path: &Path, format: OutputFormat) -> Result<()> {
    let algorithm = engine.config().search.algorithm;
    match format {
        OutputFormat::Text => print!("{}", render_path(path, algorithm)),
        OutputFormat::Json => println!("{}", to_json(&PathReport::new(path, algorithm))?),
    }
    Ok(())
}
