//! Price Server - laptop price prediction service
//!
//! Loads the model and feature schema once at startup and serves
//! predictions, health probes and Prometheus metrics over HTTP.

use anyhow::Result;
use price_server::{api, config::ServerConfig};
use pricing_lib::{
    health::HealthRegistry, observability::StructuredLogger, PricingPipeline,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting price-server");

    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        model_path = %config.pipeline.model_path.display(),
        schema_path = %config.pipeline.schema_path.display(),
        "Server configured"
    );

    let health_registry = HealthRegistry::new();
    let logger = StructuredLogger::new(&config.service_name);
    let pipeline = PricingPipeline::from_config(&config.pipeline).with_logger(logger.clone());

    let status = pipeline.status();
    health_registry.observe(&status).await;
    logger.log_startup(SERVER_VERSION, status.model_version.as_deref(), status.schema_len);

    let app_state = Arc::new(api::AppState::new(pipeline, health_registry.clone()));

    // Missing artifacts degrade the service but do not block readiness
    health_registry.set_ready(true).await;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    };
    api::serve(config.port, app_state, shutdown).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
