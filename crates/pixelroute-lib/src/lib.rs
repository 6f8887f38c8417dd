//! pixelroute library entry points.
//!
//! This crate loads a pre-surveyed map graph (named waypoints joined by
//! directed, weighted edges), snaps arbitrary pixel positions to their
//! nearest waypoint, and finds the cheapest route between waypoints. The
//! HTTP service and the CLI should only depend on the items exported here
//! instead of reimplementing behavior.
//!
//! ```no_run
//! use pixelroute_lib::{Engine, EngineConfig, Point, SearchRadius, SqliteSource};
//!
//! let config = EngineConfig::from_env()?;
//! let engine = Engine::build(&SqliteSource::new("map.db"), &config)?;
//! if let Some(near) = engine.nearest_waypoint(Point::new(120.0, 340.0), SearchRadius::default()) {
//!     println!("closest waypoint: {}", near.name);
//! }
//! # Ok::<(), pixelroute_lib::Error>(())
//! ```

pub mod config;
pub mod coords;
pub mod dataset;
pub mod db;
pub mod engine;
pub mod error;
pub mod graph;
pub mod path;
pub mod spatial;

pub use config::{EngineConfig, MapConfig, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
pub use coords::{CoordinateSpace, Origin, Point, SCALE_DIVISOR};
pub use dataset::{load_dataset, source_for_path, DataSource, Dataset, EdgeRecord, JsonSource, NodeRecord};
pub use db::{load_dataset_sqlite, write_dataset_sqlite, SqliteSource};
pub use engine::{
    validate_point, validate_radius, Endpoint, Engine, NearestWaypoint, PointRoute, SNAP_RADIUS,
};
pub use error::{Error, Result};
pub use graph::{DuplicatePolicy, Graph, LoadSummary, Waypoint, WaypointId};
pub use path::{find_path, Path, SearchAlgorithm, SearchOptions};
pub use spatial::{NearestMatch, NearestStrategy, SearchRadius, WaypointIndex, DEFAULT_MAX_DISTANCE};
