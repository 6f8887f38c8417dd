//! Engine configuration read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `MAP_HEIGHT` | `7801` | Map image height in pixels, used for the origin flip |
//! | `MAP_WIDTH` | `8500` | Map image width in pixels (reported only) |
//! | `MAP_ORIGIN` | `bottom-left` | Origin of the stored coordinates |
//! | `PIXELROUTE_NEAREST_INDEX` | `linear` | `linear` or `kdtree` |
//! | `PIXELROUTE_ALGORITHM` | `a-star` | `a-star` or `dijkstra` |
//! | `PIXELROUTE_MAX_EXPANSIONS` | unset | Upper bound on settled waypoints per search |
//! | `PIXELROUTE_DUPLICATES` | `reject` | `reject` or `keep-first` |

use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::coords::{CoordinateSpace, Origin};
use crate::error::{Error, Result};
use crate::graph::DuplicatePolicy;
use crate::path::{SearchAlgorithm, SearchOptions};
use crate::spatial::NearestStrategy;

pub const DEFAULT_MAP_HEIGHT: f64 = 7801.0;
pub const DEFAULT_MAP_WIDTH: f64 = 8500.0;

/// Dimensions and orientation of the source map.
///
/// `Default` describes data already in the canonical frame; [`from_env`]
/// applies the deployment defaults instead.
///
/// [`from_env`]: MapConfig::from_env
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MapConfig {
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub origin: Origin,
}

impl MapConfig {
    pub fn new(height: Option<f64>, origin: Origin) -> Self {
        Self {
            height,
            width: None,
            origin,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the map settings through `lookup`, which returns the raw value
    /// of a variable when it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let height = parse_number::<f64>(&lookup, "MAP_HEIGHT")?.unwrap_or(DEFAULT_MAP_HEIGHT);
        let width = parse_number::<f64>(&lookup, "MAP_WIDTH")?.unwrap_or(DEFAULT_MAP_WIDTH);
        let origin = parse_setting::<Origin>(&lookup, "MAP_ORIGIN")?.unwrap_or(Origin::BottomLeft);

        if !(height.is_finite() && height > 0.0) {
            warn!(height, "MAP_HEIGHT is not positive; coordinates will not be flipped");
        }

        Ok(Self {
            height: Some(height),
            width: Some(width),
            origin,
        })
    }

    pub fn coordinate_space(&self) -> CoordinateSpace {
        CoordinateSpace::new(self.height, self.origin)
    }
}

/// Everything needed to build an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineConfig {
    pub map: MapConfig,
    pub nearest: NearestStrategy,
    pub search: SearchOptions,
    pub duplicates: DuplicatePolicy,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let map = MapConfig::from_lookup(&lookup)?;
        let nearest = parse_setting::<NearestStrategy>(&lookup, "PIXELROUTE_NEAREST_INDEX")?
            .unwrap_or_default();
        let algorithm =
            parse_setting::<SearchAlgorithm>(&lookup, "PIXELROUTE_ALGORITHM")?.unwrap_or_default();
        let max_expansions = parse_number::<usize>(&lookup, "PIXELROUTE_MAX_EXPANSIONS")?;
        let duplicates =
            parse_setting::<DuplicatePolicy>(&lookup, "PIXELROUTE_DUPLICATES")?.unwrap_or_default();

        Ok(Self {
            map,
            nearest,
            search: SearchOptions {
                algorithm,
                max_expansions,
            },
            duplicates,
        })
    }

    pub fn with_map(mut self, map: MapConfig) -> Self {
        self.map = map;
        self
    }

    pub fn with_nearest(mut self, nearest: NearestStrategy) -> Self {
        self.nearest = nearest;
        self
    }

    pub fn with_search(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }
}

fn read_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_number<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = read_var(lookup, key) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| Error::invalid_config(key, format!("expected a number, got '{raw}'")))
}

/// Parse a setting whose `FromStr` already reports keyed configuration errors.
fn parse_setting<T: FromStr<Err = Error>>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    read_var(lookup, key).map(|raw| raw.parse::<T>()).transpose()
}
