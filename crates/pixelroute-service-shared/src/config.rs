//! Service settings read from the environment.
//!
//! - `PIXELROUTE_DATA_PATH`: dataset file (`.db`/`.sqlite` or `.json`)
//! - `SERVICE_PORT`: HTTP port (default: 8000)
//! - `ALLOWED_ORIGINS`: comma-separated CORS origins, or `*` for any
//! - `APP_NAME`: name reported by `GET /` and the health probes
//!
//! Engine settings (`MAP_HEIGHT`, `MAP_ORIGIN`, ...) are read by
//! [`pixelroute_lib::EngineConfig::from_env`].

use std::path::PathBuf;

use axum::http::{HeaderValue, Method};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

pub const DEFAULT_DATA_PATH: &str = "/data/pathfinding.db";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_APP_NAME: &str = "Pathfinding Service";

/// Origins allowed when `ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost",
    "http://localhost:8000",
    "http://localhost:3000",
    "http://127.0.0.1:5500",
];

/// Configuration for the HTTP service process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub data_path: PathBuf,
    pub port: u16,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub app_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_path = lookup("PIXELROUTE_DATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let port = match lookup("SERVICE_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid SERVICE_PORT, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or(defaults.allowed_origins);

        let app_name = lookup("APP_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.app_name);

        Self {
            data_path,
            port,
            allowed_origins,
            app_name,
        }
    }

    /// CORS layer allowing the configured origins with any method and header.
    pub fn cors_layer(&self) -> CorsLayer {
        let base = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);

        if self.allowed_origins.is_empty() {
            return base.allow_origin(Any);
        }

        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        base.allow_origin(AllowOrigin::list(origins))
    }
}

/// Split a comma-separated origin list; `*` anywhere allows every origin.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}
