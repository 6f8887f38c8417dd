use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pixelroute_cli::output::OutputFormat;
use pixelroute_lib::{
    source_for_path, DuplicatePolicy, Engine, EngineConfig, Origin, SearchAlgorithm,
};

mod commands;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pixel-map waypoint routing tools")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Dataset file: `.db`/`.sqlite`/`.sqlite3` (SQLite) or `.json`.
    #[arg(long, global = true, env = "PIXELROUTE_DATA_PATH")]
    data: Option<PathBuf>,

    /// Map height in pixels, used to flip bottom-left coordinates.
    #[arg(long, global = true)]
    map_height: Option<f64>,

    /// Corner the stored coordinates are measured from.
    #[arg(long, global = true)]
    origin: Option<Origin>,

    /// Path search algorithm (`a-star` or `dijkstra`).
    #[arg(long, global = true)]
    algorithm: Option<SearchAlgorithm>,

    /// Handling of repeated waypoint names (`reject` or `keep-first`).
    #[arg(long, global = true)]
    duplicates: Option<DuplicatePolicy>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every waypoint in load order.
    Nodes,
    /// Find the waypoint closest to a pixel position.
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        /// Search radius in scaled units (pixels / 100).
        #[arg(long)]
        max_distance: Option<f64>,
        /// Ignore the radius and always return the closest waypoint.
        #[arg(long, conflicts_with = "max_distance")]
        unbounded: bool,
    },
    /// Compute the cheapest path between two waypoint names.
    Route {
        /// Starting waypoint name.
        #[arg(long = "from")]
        from: String,
        /// Destination waypoint name.
        #[arg(long = "to")]
        to: String,
    },
    /// Compute a path between two pixel positions.
    Path {
        #[arg(long, allow_negative_numbers = true)]
        start_x: f64,
        #[arg(long, allow_negative_numbers = true)]
        start_y: f64,
        #[arg(long, allow_negative_numbers = true)]
        end_x: f64,
        #[arg(long, allow_negative_numbers = true)]
        end_y: f64,
    },
    /// Store the `--data` dataset in a SQLite database.
    Import {
        /// Destination SQLite file; existing tables are replaced.
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let global = &cli.global;
    let format = global.format;

    match cli.command {
        Command::Nodes => commands::handle_nodes(&global.load_engine()?, format),
        Command::Nearest {
            x,
            y,
            max_distance,
            unbounded,
        } => commands::handle_nearest(
            &global.load_engine()?,
            x,
            y,
            max_distance,
            unbounded,
            format,
        ),
        Command::Route { from, to } => {
            commands::handle_route(&global.load_engine()?, &from, &to, format)
        }
        Command::Path {
            start_x,
            start_y,
            end_x,
            end_y,
        } => commands::handle_path(
            &global.load_engine()?,
            (start_x, start_y),
            (end_x, end_y),
            format,
        ),
        Command::Import { output } => {
            commands::handle_import(global.dataset_path()?, &output, format)
        }
    }
}

impl GlobalArgs {
    /// Environment settings with command-line overrides applied on top.
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config =
            EngineConfig::from_env().context("invalid engine configuration in environment")?;
        if let Some(height) = self.map_height {
            config.map.height = Some(height);
        }
        if let Some(origin) = self.origin {
            config.map.origin = origin;
        }
        if let Some(algorithm) = self.algorithm {
            config.search.algorithm = algorithm;
        }
        if let Some(duplicates) = self.duplicates {
            config = config.with_duplicates(duplicates);
        }
        Ok(config)
    }

    fn dataset_path(&self) -> Result<&Path> {
        self.data
            .as_deref()
            .context("no dataset given; pass --data or set PIXELROUTE_DATA_PATH")
    }

    fn load_engine(&self) -> Result<Engine> {
        let config = self.engine_config()?;
        let path = self.dataset_path()?;
        let source = source_for_path(path)
            .with_context(|| format!("failed to open dataset {}", path.display()))?;
        Engine::build(source.as_ref(), &config)
            .with_context(|| format!("failed to load dataset from {}", path.display()))
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
