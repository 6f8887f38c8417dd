//! Integration tests for the pixelroute CLI.
//!
//! The campus fixture stores top-left coordinates, so every command passes
//! `--origin top-left` to override the bottom-left environment default.

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures/campus_map.json")
        .canonicalize()
        .expect("fixture dataset present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("pixelroute-cli");
    for key in [
        "PIXELROUTE_DATA_PATH",
        "MAP_HEIGHT",
        "MAP_WIDTH",
        "MAP_ORIGIN",
        "PIXELROUTE_ALGORITHM",
        "PIXELROUTE_NEAREST_INDEX",
        "PIXELROUTE_MAX_EXPANSIONS",
        "PIXELROUTE_DUPLICATES",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("RUST_LOG", "error");
    cmd
}

fn campus_cli() -> Command {
    let mut cmd = cli();
    cmd.arg("--data")
        .arg(fixture_path())
        .arg("--origin")
        .arg("top-left");
    cmd
}

#[test]
fn nodes_lists_every_waypoint() {
    campus_cli()
        .arg("nodes")
        .assert()
        .success()
        .stdout(predicate::str::contains("7 waypoints:"))
        .stdout(predicate::str::contains("- Gate (100, 100)"))
        .stdout(predicate::str::contains("- Island (2000, 2000)"));
}

#[test]
fn nodes_json_is_an_array() {
    let output = campus_cli()
        .args(["--format", "json", "nodes"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let nodes = value.as_array().expect("array");
    assert_eq!(nodes.len(), 7);
    assert_eq!(nodes[1]["name"], "Library");
}

#[test]
fn data_path_is_read_from_environment() {
    cli()
        .env("PIXELROUTE_DATA_PATH", fixture_path())
        .args(["--origin", "top-left", "nodes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7 waypoints:"));
}

#[test]
fn missing_data_path_is_reported() {
    cli()
        .arg("nodes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no dataset given"));
}

#[test]
fn nearest_snaps_to_closest_waypoint() {
    campus_cli()
        .args(["nearest", "--x", "395", "--y", "110"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nearest waypoint: Library (400, 100)"));
}

#[test]
fn nearest_outside_radius_fails() {
    campus_cli()
        .args(["nearest", "--x", "20000", "--y", "20000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no waypoint within 100 units"));

    campus_cli()
        .args(["nearest", "--x", "20000", "--y", "20000", "--unbounded"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Island"));
}

#[test]
fn route_prints_cheapest_path() {
    campus_cli()
        .args(["route", "--from", "Gate", "--to", "Dorm"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Path from Gate to Dorm (4 hops; algorithm: a-star)",
        ))
        .stdout(predicate::str::contains("- Hall-A (400, 400)"))
        .stdout(predicate::str::contains("Total distance: 12.00"));
}

#[test]
fn dijkstra_algorithm_is_supported() {
    campus_cli()
        .args(["--algorithm", "dijkstra", "route", "--from", "Gate", "--to", "Dorm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("algorithm: dijkstra"))
        .stdout(predicate::str::contains("Total distance: 12.00"));
}

#[test]
fn route_json_matches_service_shape() {
    let output = campus_cli()
        .args(["--format", "json", "route", "--from", "Gate", "--to", "Library"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["path"], serde_json::json!(["Gate", "Library"]));
    assert_eq!(value["coordinates"][1], serde_json::json!([400.0, 100.0]));
    assert_eq!(value["total_distance"], 3.0);
    assert_eq!(value["hops"], 1);
}

#[test]
fn route_with_typo_suggests_name() {
    campus_cli()
        .args(["route", "--from", "Libary", "--to", "Dorm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'Library'?"));
}

#[test]
fn route_against_one_way_edge_fails() {
    campus_cli()
        .args(["route", "--from", "Cafeteria", "--to", "Gate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cafeteria"));
}

#[test]
fn path_between_pixel_points() {
    campus_cli()
        .args([
            "path", "--start-x", "101", "--start-y", "99", "--end-x", "699", "--end-y", "701",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Path from Gate to Dorm"));
}

#[test]
fn path_from_lost_point_names_the_endpoint() {
    campus_cli()
        .args([
            "path", "--start-x", "100", "--start-y", "100", "--end-x", "-20000", "--end-y",
            "-20000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("end point"));
}

#[test]
fn bottom_left_origin_flips_coordinates() {
    cli()
        .arg("--data")
        .arg(fixture_path())
        .args(["--origin", "bottom-left", "--map-height", "1000", "nodes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Gate (100, 900)"));
}

#[test]
fn duplicate_names_follow_policy() {
    let dir = tempdir().expect("create temp dir");
    let data = dir.path().join("twins.json");
    std::fs::write(
        &data,
        r#"{
  "nodes": [
    { "name": "Gate", "x": 100.0, "y": 100.0 },
    { "name": "Gate", "x": 900.0, "y": 900.0 }
  ],
  "edges": []
}"#,
    )
    .expect("write dataset");

    cli()
        .arg("--data")
        .arg(&data)
        .args(["--origin", "top-left", "nodes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate waypoint name"));

    cli()
        .arg("--data")
        .arg(&data)
        .args(["--origin", "top-left", "--duplicates", "keep-first", "nodes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 waypoints:"))
        .stdout(predicate::str::contains("- Gate (100, 100)"));
}

#[test]
fn import_writes_queryable_sqlite() {
    let dir = tempdir().expect("create temp dir");
    let db_path = dir.path().join("campus.db");

    cli()
        .arg("--data")
        .arg(fixture_path())
        .arg("import")
        .arg("--output")
        .arg(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 7 waypoints and 9 edges"));

    cli()
        .arg("--data")
        .arg(&db_path)
        .args(["--origin", "top-left", "route", "--from", "Gate", "--to", "Dorm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total distance: 12.00"));
}
