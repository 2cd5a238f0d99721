//! Server configuration

use anyhow::Result;
use pricing_lib::PipelineConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Optional config file looked up in the working directory (any format the
/// config crate understands, e.g. `price-server.toml`)
const DEFAULT_CONFIG_FILE: &str = "price-server";

/// Environment variable prefix, e.g. `PRICE_PORT`, `PRICE_MODEL_PATH`
const ENV_PREFIX: &str = "PRICE";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name attached to structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Port for the prediction, health and metrics endpoints
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

fn default_service_name() -> String {
    "price-server".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            port: default_port(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment and the optional config file
    pub fn load() -> Result<Self> {
        Self::build(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// Load configuration from an explicit file, still honouring the environment
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|e| {
            warn!(error = %e, "Invalid server configuration, using defaults");
            ServerConfig::default()
        }))
    }
}
