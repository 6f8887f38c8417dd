use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, info};

use crate::dataset::{DataSource, Dataset, EdgeRecord, NodeRecord};
use crate::error::{Error, Result};

const NODES_TABLE: &str = "nodes";
const EDGES_TABLE: &str = "edges";
const NODE_COLUMNS: [&str; 3] = ["name", "x", "y"];
const EDGE_COLUMNS: [&str; 3] = ["node_from", "node_to", "weight"];

/// SQLite database holding `nodes` and `edges` tables.
///
/// The connection is opened read-only for the duration of a single
/// [`load`](DataSource::load) call and dropped afterwards; the engine never
/// keeps a database handle alive.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn load(&self) -> Result<Dataset> {
        load_dataset_sqlite(&self.path)
    }
}

/// Read every node and edge row from a SQLite dataset.
pub fn load_dataset_sqlite(db_path: &Path) -> Result<Dataset> {
    if !db_path.exists() {
        return Err(Error::DatasetNotFound {
            path: db_path.to_path_buf(),
        });
    }

    let connection = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    detect_schema(&connection)?;
    debug!(path = %db_path.display(), "loading map dataset");

    let nodes = load_nodes(&connection)?;
    let edges = load_edges(&connection)?;
    debug!(nodes = nodes.len(), edges = edges.len(), "read sqlite dataset");

    Ok(Dataset { nodes, edges })
}

/// Create (or replace the contents of) a SQLite dataset at `db_path`.
///
/// Node names must be unique. Repeated ordered edge pairs keep the last
/// weight, matching how the graph builder treats them.
pub fn write_dataset_sqlite(db_path: &Path, dataset: &Dataset) -> Result<()> {
    let mut seen = HashSet::new();
    for node in &dataset.nodes {
        if !seen.insert(node.name.as_str()) {
            return Err(Error::DuplicateWaypoint {
                name: node.name.clone(),
            });
        }
    }

    let mut connection = Connection::open(db_path)?;
    create_schema(&connection)?;

    let tx = connection.transaction()?;
    tx.execute(&format!("DELETE FROM {EDGES_TABLE}"), [])?;
    tx.execute(&format!("DELETE FROM {NODES_TABLE}"), [])?;
    {
        let mut insert_node =
            tx.prepare(&format!("INSERT INTO {NODES_TABLE} (name, x, y) VALUES (?1, ?2, ?3)"))?;
        for node in &dataset.nodes {
            insert_node.execute(params![node.name, node.x, node.y])?;
        }

        let mut insert_edge = tx.prepare(&format!(
            "INSERT OR REPLACE INTO {EDGES_TABLE} (node_from, node_to, weight) VALUES (?1, ?2, ?3)"
        ))?;
        for edge in &dataset.edges {
            insert_edge.execute(params![edge.from, edge.to, edge.weight])?;
        }
    }
    tx.commit()?;

    info!(
        path = %db_path.display(),
        nodes = dataset.nodes.len(),
        edges = dataset.edges.len(),
        "wrote sqlite dataset"
    );
    Ok(())
}

fn create_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {NODES_TABLE} (
             name TEXT PRIMARY KEY NOT NULL,
             x REAL NOT NULL,
             y REAL NOT NULL
         );
         CREATE TABLE IF NOT EXISTS {EDGES_TABLE} (
             node_from TEXT NOT NULL REFERENCES {NODES_TABLE}(name),
             node_to TEXT NOT NULL REFERENCES {NODES_TABLE}(name),
             weight REAL NOT NULL,
             PRIMARY KEY (node_from, node_to)
         );"
    ))?;
    Ok(())
}

fn detect_schema(connection: &Connection) -> Result<()> {
    if !table_exists(connection, NODES_TABLE)? || !table_exists(connection, EDGES_TABLE)? {
        return Err(Error::UnsupportedSchema);
    }
    if !table_has_columns(connection, NODES_TABLE, &NODE_COLUMNS)?
        || !table_has_columns(connection, EDGES_TABLE, &EDGE_COLUMNS)?
    {
        return Err(Error::UnsupportedSchema);
    }
    Ok(())
}

fn load_nodes(connection: &Connection) -> Result<Vec<NodeRecord>> {
    // rowid keeps the listing order stable across loads.
    let mut stmt =
        connection.prepare(&format!("SELECT name, x, y FROM {NODES_TABLE} ORDER BY rowid"))?;
    let rows = stmt.query_map([], |row| {
        Ok(NodeRecord {
            name: row.get(0)?,
            x: row.get(1)?,
            y: row.get(2)?,
        })
    })?;

    let mut nodes = Vec::new();
    for row in rows {
        nodes.push(row?);
    }
    Ok(nodes)
}

fn load_edges(connection: &Connection) -> Result<Vec<EdgeRecord>> {
    let mut stmt = connection.prepare(&format!(
        "SELECT node_from, node_to, weight FROM {EDGES_TABLE} ORDER BY rowid"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(EdgeRecord {
            from: row.get(0)?,
            to: row.get(1)?,
            weight: row.get(2)?,
        })
    })?;

    let mut edges = Vec::new();
    for row in rows {
        edges.push(row?);
    }
    Ok(edges)
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
