//! Laptop Price Predictor CLI
//!
//! Predicts laptop prices from the command line, either locally against the
//! model artifacts or through a running price server.

mod client;
mod commands;
mod config;
mod output;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{normalize, predict, schema};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Laptop Price Predictor CLI
#[derive(Parser)]
#[command(name = "lpp")]
#[command(author, version, about = "CLI for the Laptop Price Predictor", long_about = None)]
pub struct Cli {
    /// Price server URL; predictions run locally when not set
    #[arg(long, env = "LPP_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Model artifact (.onnx or .json)
    #[arg(long, env = "LPP_MODEL_PATH", global = true)]
    pub model_path: Option<PathBuf>,

    /// Feature schema artifact (JSON array of column names)
    #[arg(long, env = "LPP_SCHEMA_PATH", global = true)]
    pub schema_path: Option<PathBuf>,

    /// Event log for corrections and rejected inputs
    #[arg(long, env = "LPP_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the price of a laptop
    Predict(predict::PredictArgs),

    /// Show the feature schema the model was trained on
    Schema,

    /// Show how a single raw value is normalized
    Normalize {
        /// Field name (e.g. Company, OpSys, Ram, SSD)
        field: String,

        /// Raw value as a user would type it
        value: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = config::Config::load()?;
    let settings = file_config.resolve(&cli);

    match cli.command {
        Commands::Predict(args) => predict::run(&settings, args).await?,
        Commands::Schema => schema::run(&settings).await?,
        Commands::Normalize { field, value } => normalize::run(&settings, &field, &value)?,
    }

    Ok(())
}
