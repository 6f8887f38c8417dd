//! Import command: copy any supported dataset into a SQLite database.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use pixelroute_cli::output::{to_json, OutputFormat};
use pixelroute_lib::{load_dataset, write_dataset_sqlite};

#[derive(Debug, Serialize)]
struct ImportReport<'a> {
    output: &'a str,
    nodes: usize,
    edges: usize,
}

/// Raw coordinates are stored unchanged; the flip to the canonical frame
/// happens when an engine is built from the database.
pub fn handle_import(input: &Path, output: &Path, format: OutputFormat) -> Result<()> {
    let dataset = load_dataset(input)
        .with_context(|| format!("failed to read dataset from {}", input.display()))?;
    write_dataset_sqlite(output, &dataset)
        .with_context(|| format!("failed to write SQLite dataset to {}", output.display()))?;

    let output_display = output.display().to_string();
    let report = ImportReport {
        output: &output_display,
        nodes: dataset.nodes.len(),
        edges: dataset.edges.len(),
    };

    match format {
        OutputFormat::Text => println!(
            "Imported {} waypoints and {} edges into {}",
            report.nodes, report.edges, report.output
        ),
        OutputFormat::Json => println!("{}", to_json(&report)?),
    }
    Ok(())
}
