//! Test utilities for handler testing.
//!
//! Provides a shared [`AppState`] loaded from the campus fixture map. The
//! fixture stores top-left pixel coordinates, so the state is built without
//! a vertical flip.

use std::path::PathBuf;
use std::sync::OnceLock;

use pixelroute_lib::{EngineConfig, MapConfig, Origin};

use crate::state::AppState;

/// Path to the campus fixture map.
pub const TEST_FIXTURE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../docs/fixtures/campus_map.json"
);

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Engine configuration matching the fixture's coordinate frame.
pub fn fixture_config() -> EngineConfig {
    EngineConfig::default().with_map(MapConfig::new(None, Origin::TopLeft))
}

/// Get a shared test AppState loaded from the campus fixture.
///
/// # Panics
///
/// Panics if the fixture cannot be loaded. This indicates a test
/// configuration issue.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            let path = PathBuf::from(TEST_FIXTURE_PATH);
            AppState::load(&path, fixture_config())
                .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e))
        })
        .clone()
}

pub fn fixture_map_path() -> PathBuf {
    PathBuf::from(TEST_FIXTURE_PATH)
}

/// Waypoint names in the campus fixture.
pub mod fixture_waypoints {
    /// (100, 100). Entry point of the campus.
    pub const GATE: &str = "Gate";

    /// (400, 100). One hop from Gate, both directions.
    pub const LIBRARY: &str = "Library";

    /// (400, 400). Hub of the map.
    pub const HALL_A: &str = "Hall-A";

    /// (100, 400). Reachable from Gate but has no way back.
    pub const CAFETERIA: &str = "Cafeteria";

    /// (700, 400).
    pub const LAB: &str = "Lab";

    /// (700, 700). Gate to Dorm costs 12 via Library, Hall-A, Lab.
    pub const DORM: &str = "Dorm";

    /// (2000, 2000). No edges at all.
    pub const ISLAND: &str = "Island";
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}
