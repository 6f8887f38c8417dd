use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the pixelroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Expected misses (no nearby waypoint, no path) are modelled as `Option` or
/// outcome values by the engine itself. The matching variants here exist so
/// callers (CLI, HTTP layer) can surface those outcomes as errors when they
/// choose to.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// The dataset file extension does not map to a known source.
    #[error("unsupported dataset format for {path}; expected .db, .sqlite, or .json")]
    UnsupportedDatasetFormat { path: PathBuf },

    /// Raised when a SQLite dataset lacks the expected tables.
    #[error("unsupported dataset schema; expected nodes(name, x, y) and edges(node_from, node_to, weight) tables")]
    UnsupportedSchema,

    /// Two node records share the same waypoint name.
    #[error("duplicate waypoint name encountered: {name}")]
    DuplicateWaypoint { name: String },

    /// A configuration value could not be parsed.
    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// Caller supplied input that fails boundary validation.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A waypoint name could not be found in the graph.
    #[error("unknown waypoint name: {name}{}", format_suggestions(.suggestions))]
    UnknownWaypoint {
        name: String,
        suggestions: Vec<String>,
    },

    /// No waypoint lies within the search radius of a point.
    #[error("no waypoint near ({x}, {y})")]
    NoNearbyWaypoint { x: f64, y: f64 },

    /// No directed path connects the two waypoints.
    #[error("no path found from {start} to {goal}")]
    PathNotFound { start: String, goal: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON dataset parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_config(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
