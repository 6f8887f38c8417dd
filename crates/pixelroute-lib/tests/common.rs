#![allow(dead_code)]

use std::path::PathBuf;

use pixelroute_lib::{Engine, EngineConfig, JsonSource, MapConfig, Origin};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn campus_path() -> PathBuf {
    fixtures_dir().join("campus_map.json")
}

/// Fixture coordinates are already top-left.
pub fn campus_config() -> EngineConfig {
    EngineConfig::default().with_map(MapConfig::new(None, Origin::TopLeft))
}

pub fn campus_engine() -> Engine {
    Engine::build(&JsonSource::new(campus_path()), &campus_config()).expect("fixture loads")
}
