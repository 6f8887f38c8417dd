//! End-to-end engine tests against the campus fixture.

mod common;

use common::{campus_config, campus_engine};
use pixelroute_lib::{
    Endpoint, Engine, Error, NearestStrategy, Point, PointRoute, SearchOptions, SearchRadius,
};

#[test]
fn fixture_load_drops_edges_to_unknown_waypoints() {
    let engine = campus_engine();
    let summary = engine.summary();
    assert_eq!(summary.waypoints, 7);
    assert_eq!(summary.edges, 8);
    assert_eq!(summary.unknown_endpoint_edges, 1);
    assert!(engine.source().starts_with("json:"));
}

#[test]
fn shortest_route_prefers_cheaper_branch() {
    let engine = campus_engine();
    let path = engine.find_path("Gate", "Dorm").expect("route exists");
    assert_eq!(path.waypoints, ["Gate", "Library", "Hall-A", "Lab", "Dorm"]);
    assert!((path.total_cost - 12.0).abs() < 1e-9);
    assert_eq!(path.coordinates.first(), Some(&[100.0, 100.0]));
    assert_eq!(path.coordinates.last(), Some(&[700.0, 700.0]));
}

#[test]
fn path_cost_matches_traversed_edges() {
    let engine = campus_engine();
    let path = engine.find_path("Cafeteria", "Dorm").expect("route exists");
    let graph = engine.graph();
    let summed: f64 = path
        .waypoints
        .windows(2)
        .map(|pair| {
            graph
                .outgoing(&pair[0])
                .into_iter()
                .find(|(target, _)| *target == pair[1])
                .map(|(_, weight)| weight)
                .expect("consecutive waypoints are joined by an edge")
        })
        .sum();
    assert!((summed - path.total_cost).abs() < 1e-9);
}

#[test]
fn one_way_edges_are_respected() {
    let engine = campus_engine();
    assert!(engine.find_path("Gate", "Library").is_some());
    assert!(engine.find_path("Library", "Gate").is_some());
    assert!(engine.find_path("Gate", "Cafeteria").is_some());
    assert!(engine.find_path("Cafeteria", "Gate").is_none());
    assert!(engine.find_path("Dorm", "Gate").is_none());
}

#[test]
fn dijkstra_and_a_star_agree_on_fixture() {
    let a_star = campus_engine();
    let dijkstra = Engine::build(
        &pixelroute_lib::JsonSource::new(common::campus_path()),
        &campus_config().with_search(SearchOptions::dijkstra()),
    )
    .unwrap();

    for (start, goal) in [("Gate", "Dorm"), ("Cafeteria", "Lab"), ("Library", "Dorm")] {
        let a = a_star.find_path(start, goal).unwrap();
        let d = dijkstra.find_path(start, goal).unwrap();
        assert!((a.total_cost - d.total_cost).abs() < 1e-9, "{start} -> {goal}");
    }
}

#[test]
fn nearest_lookup_matches_across_strategies() {
    let linear = campus_engine();
    let kd = Engine::build(
        &pixelroute_lib::JsonSource::new(common::campus_path()),
        &campus_config().with_nearest(NearestStrategy::KdTree),
    )
    .unwrap();

    for (x, y) in [(110.0, 95.0), (390.0, 420.0), (690.0, 710.0), (1900.0, 2100.0)] {
        let point = Point::new(x, y);
        let a = linear.nearest_waypoint(point, SearchRadius::default());
        let b = kd.nearest_waypoint(point, SearchRadius::default());
        assert_eq!(a.map(|w| w.name), b.map(|w| w.name), "({x}, {y})");
    }
}

#[test]
fn point_routes_report_each_miss_separately() {
    let engine = campus_engine();

    let route = engine
        .find_path_between_points(Point::new(105.0, 98.0), Point::new(702.0, 695.0))
        .unwrap();
    assert!(matches!(route, PointRoute::Found(ref path) if path.waypoints.len() == 5));

    let far = Point::new(20_000.0, 20_000.0);
    let route = engine
        .find_path_between_points(Point::new(105.0, 98.0), far)
        .unwrap();
    assert_eq!(
        route,
        PointRoute::NoNearbyWaypoint {
            endpoint: Endpoint::End,
            point: far
        }
    );

    let route = engine
        .find_path_between_points(Point::new(2000.0, 2000.0), Point::new(100.0, 100.0))
        .unwrap();
    assert!(matches!(route, PointRoute::NoPath { ref start, .. } if start == "Island"));
    assert!(matches!(route.into_result(), Err(Error::PathNotFound { .. })));
}

#[test]
fn unknown_names_get_suggestions() {
    let engine = campus_engine();
    let err = engine.route_by_name("Libary", "Dorm").unwrap_err();
    assert!(err.to_string().contains("Did you mean 'Library'?"), "{err}");
}
