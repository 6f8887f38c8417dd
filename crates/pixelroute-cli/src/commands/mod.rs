//! Subcommand handlers. Each prints its result to stdout in the requested
//! format; failures are returned to `main` for reporting.

mod import;
mod query;

pub use import::handle_import;
pub use query::{handle_nearest, handle_nodes, handle_path, handle_route};
