//! Application state for the HTTP service.
//!
//! The state holds the current [`Engine`] behind a lock that is only taken
//! to clone an `Arc`. Queries run against that snapshot without holding the
//! lock, so a reload never blocks in-flight requests: they finish on the
//! engine they started with.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use pixelroute_lib::{source_for_path, Engine, EngineConfig, Error as LibError};

/// Error during application state initialization or reload.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to build the engine from the dataset.
    EngineLoad(LibError),

    /// Dataset file not found.
    DatasetNotFound(String),

    /// The state was created without a dataset path, so it cannot reload.
    NoDataSource,
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EngineLoad(e) => write!(f, "failed to load map engine: {}", e),
            Self::DatasetNotFound(path) => write!(f, "dataset not found: {}", path),
            Self::NoDataSource => write!(f, "no dataset path configured"),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EngineLoad(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        match err {
            LibError::DatasetNotFound { path } => Self::DatasetNotFound(path.display().to_string()),
            other => Self::EngineLoad(other),
        }
    }
}

/// The engine currently serving requests, or why there is none.
#[derive(Debug, Clone)]
pub enum EngineSlot {
    Ready {
        engine: Arc<Engine>,
        loaded_at: DateTime<Utc>,
    },
    Unavailable {
        reason: String,
        since: DateTime<Utc>,
    },
}

/// Point-in-time view of the engine used by the health probes.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waypoints: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Configured map size in pixels, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_height: Option<f64>,
    /// RFC 3339 timestamp of the last load or failure.
    pub since: String,
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use pixelroute_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     if let Ok(engine) = state.engine() {
///         let count = engine.list_waypoints().len();
///     }
/// }
///
/// let state = AppState::load("map.db", EngineConfig::default()).unwrap();
/// let app = Router::new()
///     .route("/api/pathfinding/nodes", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    slot: RwLock<EngineSlot>,
    data_path: Option<PathBuf>,
    config: EngineConfig,
    app_name: String,
}

impl AppState {
    /// Build the engine from a dataset file.
    ///
    /// The data source is chosen by file extension (see
    /// [`pixelroute_lib::source_for_path`]).
    pub fn load(data_path: impl AsRef<Path>, config: EngineConfig) -> Result<Self, AppStateError> {
        let data_path = data_path.as_ref();
        let engine = build_engine(data_path, &config)?;
        Ok(Self::with_slot(
            ready_slot(engine),
            Some(data_path.to_path_buf()),
            config,
        ))
    }

    /// Like [`load`](Self::load), but a failure leaves the service running
    /// in a degraded state where every query answers 503.
    pub fn load_or_unavailable(data_path: impl AsRef<Path>, config: EngineConfig) -> Self {
        let data_path = data_path.as_ref();
        let slot = match build_engine(data_path, &config) {
            Ok(engine) => ready_slot(engine),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %data_path.display(),
                    "map engine unavailable, serving 503 until reloaded"
                );
                EngineSlot::Unavailable {
                    reason: e.to_string(),
                    since: Utc::now(),
                }
            }
        };
        Self::with_slot(slot, Some(data_path.to_path_buf()), config)
    }

    /// Create application state from a pre-built engine.
    ///
    /// This is useful for testing; such a state cannot [`reload`](Self::reload).
    pub fn from_engine(engine: Engine) -> Self {
        let config = *engine.config();
        Self::with_slot(ready_slot(engine), None, config)
    }

    /// State with no engine; every query reports `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::with_slot(
            EngineSlot::Unavailable {
                reason: reason.into(),
                since: Utc::now(),
            },
            None,
            EngineConfig::default(),
        )
    }

    fn with_slot(slot: EngineSlot, data_path: Option<PathBuf>, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                slot: RwLock::new(slot),
                data_path,
                config,
                app_name: crate::config::DEFAULT_APP_NAME.to_string(),
            }),
        }
    }

    /// Set the name reported by the banner and health endpoints.
    pub fn with_app_name(self, app_name: impl Into<String>) -> Self {
        let slot = self.slot();
        Self {
            inner: Arc::new(AppStateInner {
                slot: RwLock::new(slot),
                data_path: self.inner.data_path.clone(),
                config: self.inner.config,
                app_name: app_name.into(),
            }),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.inner.app_name
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.inner.data_path.as_deref()
    }

    /// Snapshot of the current engine, or the reason it is unavailable.
    pub fn engine(&self) -> Result<Arc<Engine>, String> {
        match self.slot() {
            EngineSlot::Ready { engine, .. } => Ok(engine),
            EngineSlot::Unavailable { reason, .. } => Err(reason),
        }
    }

    pub fn status(&self) -> EngineStatus {
        let map = self.inner.config.map;
        match self.slot() {
            EngineSlot::Ready { engine, loaded_at } => EngineStatus {
                ready: true,
                waypoints: Some(engine.list_waypoints().len()),
                edges: Some(engine.graph().edge_count()),
                source: Some(engine.source().to_string()),
                reason: None,
                map_width: map.width,
                map_height: map.height,
                since: loaded_at.to_rfc3339(),
            },
            EngineSlot::Unavailable { reason, since } => EngineStatus {
                ready: false,
                waypoints: None,
                edges: None,
                source: None,
                reason: Some(reason),
                map_width: map.width,
                map_height: map.height,
                since: since.to_rfc3339(),
            },
        }
    }

    /// Swap in a new engine. Requests already holding the old one keep it.
    pub fn replace(&self, engine: Engine) {
        let mut slot = self
            .inner
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = ready_slot(engine);
    }

    /// Rebuild the engine from the configured dataset and swap it in.
    ///
    /// On failure the current engine (or unavailable state) is kept.
    pub fn reload(&self) -> Result<(), AppStateError> {
        let data_path = self
            .inner
            .data_path
            .as_deref()
            .ok_or(AppStateError::NoDataSource)?;
        let engine = build_engine(data_path, &self.inner.config)?;
        self.replace(engine);
        tracing::info!(path = %data_path.display(), "map engine reloaded");
        Ok(())
    }

    fn slot(&self) -> EngineSlot {
        self.inner
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn build_engine(data_path: &Path, config: &EngineConfig) -> Result<Engine, AppStateError> {
    if !data_path.exists() {
        return Err(AppStateError::DatasetNotFound(
            data_path.display().to_string(),
        ));
    }

    tracing::info!(path = %data_path.display(), "loading map dataset");
    let source = source_for_path(data_path)?;
    Ok(Engine::build(source.as_ref(), config)?)
}

fn ready_slot(engine: Engine) -> EngineSlot {
    EngineSlot::Ready {
        engine: Arc::new(engine),
        loaded_at: Utc::now(),
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status();
        f.debug_struct("AppState")
            .field("ready", &status.ready)
            .field("waypoint_count", &status.waypoints)
            .field("data_path", &self.inner.data_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelroute_lib::{Dataset, EdgeRecord, NodeRecord};

    fn engine(nodes: &[(&str, f64, f64)]) -> Engine {
        let dataset = Dataset::new(
            nodes
                .iter()
                .map(|(name, x, y)| NodeRecord::new(*name, *x, *y))
                .collect(),
            vec![EdgeRecord::new("A", "B", 1.0)],
        );
        Engine::from_dataset(&dataset, &EngineConfig::default()).unwrap()
    }

    fn write_json(path: &Path, nodes: &[(&str, f64, f64)]) {
        let dataset = Dataset::new(
            nodes
                .iter()
                .map(|(name, x, y)| NodeRecord::new(*name, *x, *y))
                .collect(),
            Vec::new(),
        );
        std::fs::write(path, serde_json::to_string(&dataset).unwrap()).unwrap();
    }

    #[test]
    fn test_app_state_from_engine() {
        let state = AppState::from_engine(engine(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]));
        assert!(state.status().ready);
        assert_eq!(state.engine().unwrap().list_waypoints().len(), 2);
        assert!(state.data_path().is_none());
    }

    #[test]
    fn test_app_state_clone_shares_engine() {
        let state1 = AppState::from_engine(engine(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]));
        let state2 = state1.clone();
        state1.replace(engine(&[("A", 0.0, 0.0)]));
        assert_eq!(state2.engine().unwrap().list_waypoints().len(), 1);
    }

    #[test]
    fn test_in_flight_snapshot_survives_replace() {
        let state = AppState::from_engine(engine(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]));
        let snapshot = state.engine().unwrap();
        state.replace(engine(&[("A", 0.0, 0.0)]));
        assert_eq!(snapshot.list_waypoints().len(), 2);
        assert_eq!(state.engine().unwrap().list_waypoints().len(), 1);
    }

    #[test]
    fn test_app_state_debug() {
        let state = AppState::from_engine(engine(&[("A", 0.0, 0.0)]));
        let debug = format!("{:?}", state);
        assert!(debug.contains("AppState"));
        assert!(debug.contains("waypoint_count"));
    }

    #[test]
    fn test_unavailable_state_reports_reason() {
        let state = AppState::unavailable("dataset missing");
        assert!(!state.status().ready);
        assert_eq!(state.engine().unwrap_err(), "dataset missing");
        let status = state.status();
        assert!(!status.ready);
        assert_eq!(status.reason.as_deref(), Some("dataset missing"));
    }

    #[test]
    fn test_app_state_load_nonexistent() {
        let result = AppState::load("/nonexistent/path/to/map.db", EngineConfig::default());
        match result.unwrap_err() {
            AppStateError::DatasetNotFound(path) => assert!(path.contains("nonexistent")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_or_unavailable_degrades() {
        let state =
            AppState::load_or_unavailable("/nonexistent/map.json", EngineConfig::default());
        assert!(!state.status().ready);
        assert!(state.engine().unwrap_err().contains("not found"));
    }

    #[test]
    fn test_reload_picks_up_new_data_and_keeps_old_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        write_json(&path, &[("A", 0.0, 0.0)]);

        let state = AppState::load(&path, EngineConfig::default()).unwrap();
        assert_eq!(state.engine().unwrap().list_waypoints().len(), 1);

        write_json(&path, &[("A", 0.0, 0.0), ("B", 5.0, 5.0)]);
        state.reload().unwrap();
        assert_eq!(state.engine().unwrap().list_waypoints().len(), 2);

        std::fs::write(&path, "not json").unwrap();
        assert!(state.reload().is_err());
        assert_eq!(state.engine().unwrap().list_waypoints().len(), 2);
    }

    #[test]
    fn test_reload_without_source_fails() {
        let state = AppState::from_engine(engine(&[("A", 0.0, 0.0)]));
        assert!(matches!(state.reload(), Err(AppStateError::NoDataSource)));
    }
}
