//! Pathfinding HTTP service binary.
//!
//! # Configuration
//!
//! - `PIXELROUTE_DATA_PATH` - Dataset file, `.db`/`.sqlite` or `.json` (default: /data/pathfinding.db)
//! - `SERVICE_PORT` - HTTP port (default: 8000)
//! - `ALLOWED_ORIGINS` - Comma-separated CORS origins, `*` for any
//! - `MAP_HEIGHT`, `MAP_WIDTH`, `MAP_ORIGIN` - Stored coordinate frame
//! - `PIXELROUTE_NEAREST_INDEX`, `PIXELROUTE_ALGORITHM`, `PIXELROUTE_MAX_EXPANSIONS`,
//!   `PIXELROUTE_DUPLICATES` - Engine tuning
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//!
//! Sending `SIGHUP` rebuilds the engine from the dataset; a failed rebuild
//! keeps the engine already serving.

use std::net::SocketAddr;

use tracing::{error, info, warn};

use pixelroute_lib::EngineConfig;
use pixelroute_service::app;
use pixelroute_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig, MetricsError,
    ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_default_service("pixelroute-service");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    match init_metrics(&metrics_config) {
        Ok(()) => {}
        Err(MetricsError::Disabled) => info!("metrics disabled"),
        Err(e) => {
            warn!(error = %e, "failed to initialize metrics, continuing without metrics");
        }
    }

    let service_config = ServiceConfig::from_env();
    let engine_config = EngineConfig::from_env().map_err(|e| {
        error!(error = %e, "invalid engine configuration");
        e
    })?;

    info!(
        data_path = %service_config.data_path.display(),
        port = service_config.port,
        origin = %engine_config.map.origin,
        algorithm = %engine_config.search.algorithm,
        "starting pathfinding service"
    );

    let state = AppState::load_or_unavailable(&service_config.data_path, engine_config)
        .with_app_name(service_config.app_name.clone());

    if let Ok(engine) = state.engine() {
        let summary = engine.summary();
        info!(
            waypoints = summary.waypoints,
            edges = summary.edges,
            source = %engine.source(),
            "application state loaded"
        );
    }

    spawn_reload_on_hangup(state.clone());

    let app = app(state, &service_config, &metrics_config);

    let addr = SocketAddr::from(([0, 0, 0, 0], service_config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

#[cfg(unix)]
fn spawn_reload_on_hangup(state: AppState) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGHUP, hot reload disabled");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            info!(path = ?state.data_path(), "SIGHUP received, reloading map engine");
            let state = state.clone();
            match tokio::task::spawn_blocking(move || state.reload()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "reload failed, keeping current engine"),
                Err(e) => error!(error = %e, "reload task aborted"),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_state: AppState) {}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
