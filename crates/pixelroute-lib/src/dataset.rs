//! Raw node and edge records and the sources that supply them.
//!
//! The engine never talks to storage directly. A [`DataSource`] hands over a
//! [`Dataset`] once at construction; the graph builder validates and
//! normalizes it from there.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::SqliteSource;
use crate::error::{Error, Result};

/// Raw waypoint record as stored by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl NodeRecord {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }
}

/// Raw directed edge record as stored by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(alias = "node_from")]
    pub from: String,
    #[serde(alias = "node_to")]
    pub to: String,
    pub weight: f64,
}

impl EdgeRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>, weight: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }
}

/// Both record streams, as read from a source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl Dataset {
    pub fn new(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Self {
        Self { nodes, edges }
    }
}

/// Supplies node and edge records to the engine.
pub trait DataSource: Send + Sync {
    /// Short label used in logs and health output.
    fn describe(&self) -> String;

    /// Read every node and edge record.
    fn load(&self) -> Result<Dataset>;
}

impl DataSource for Dataset {
    fn describe(&self) -> String {
        "in-memory".to_string()
    }

    fn load(&self) -> Result<Dataset> {
        Ok(self.clone())
    }
}

/// JSON document of the form `{"nodes": [...], "edges": [...]}`.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for JsonSource {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn load(&self) -> Result<Dataset> {
        if !self.path.exists() {
            return Err(Error::DatasetNotFound {
                path: self.path.clone(),
            });
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let dataset: Dataset = serde_json::from_reader(reader)?;
        debug!(
            path = %self.path.display(),
            nodes = dataset.nodes.len(),
            edges = dataset.edges.len(),
            "read json dataset"
        );
        Ok(dataset)
    }
}

/// Pick a source for `path` based on its extension.
pub fn source_for_path(path: &Path) -> Result<Box<dyn DataSource>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("db") | Some("sqlite") | Some("sqlite3") => Ok(Box::new(SqliteSource::new(path))),
        Some("json") => Ok(Box::new(JsonSource::new(path))),
        _ => Err(Error::UnsupportedDatasetFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load a dataset from a file, choosing the source by extension.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    source_for_path(path)?.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn json_source_reads_both_streams() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"nodes":[{{"name":"A","x":1.0,"y":2.0}}],
               "edges":[{{"from":"A","to":"A","weight":0.5}}]}}"#
        )
        .unwrap();

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.nodes, vec![NodeRecord::new("A", 1.0, 2.0)]);
        assert_eq!(dataset.edges, vec![EdgeRecord::new("A", "A", 0.5)]);
    }

    #[test]
    fn json_edges_accept_column_style_names() {
        let json = r#"{"edges":[{"node_from":"A","node_to":"B","weight":2.0}]}"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert!(dataset.nodes.is_empty());
        assert_eq!(dataset.edges[0].from, "A");
        assert_eq!(dataset.edges[0].to, "B");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = source_for_path(Path::new("map.csv")).err().unwrap();
        assert!(matches!(err, Error::UnsupportedDatasetFormat { .. }));
    }

    #[test]
    fn missing_json_file_reports_path() {
        let err = JsonSource::new("/nonexistent/map.json").load().unwrap_err();
        assert!(matches!(err, Error::DatasetNotFound { .. }));
    }
}
