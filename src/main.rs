// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::csv_repository::CsvRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_dashboard, get_sensor, health_check, list_sensors, stream_dashboard,
};
use crate::presentation::page::index;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_app_config()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Create repository (infrastructure layer)
    let csv_path = config.csv_path();
    let repository = Arc::new(CsvRepository::new(csv_path.clone()));

    // Create services (application layer)
    let catalog = config.sensor_catalog();
    tracing::info!(
        csv_path = %csv_path.display(),
        sensors = ?catalog.ids(),
        max_display_points = config.processing.max_display_points,
        "Telemetry source configured"
    );
    let dashboard_service =
        DashboardService::new(repository, catalog, config.processing.clone());

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    // Compression is negotiated in the JSON response builder, not via a layer
    let router = Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/api/sensors", get(list_sensors))
        .route("/api/sensors/:id", get(get_sensor))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/dashboard/stream", get(stream_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(%addr, "Starting telemetry dashboard");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
