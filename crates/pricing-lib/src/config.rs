//! Pipeline configuration
//!
//! Shared by the server and the CLI; each front end fills it from its own
//! sources (config crate / clap) and hands it to [`crate::PricingPipeline`].

use crate::predictor::{PlausibilityBounds, MAX_PLAUSIBLE_PRICE, MIN_PLAUSIBLE_PRICE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Artifact locations and prediction policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Model artifact (`.onnx` or `.json`)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// JSON array of feature column names
    #[serde(default = "default_schema_path")]
    pub schema_path: PathBuf,

    /// Append-only event log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Expected hex SHA-256 of the model file
    #[serde(default)]
    pub model_sha256: Option<String>,

    #[serde(default = "default_price_min")]
    pub price_min: f64,

    #[serde(default = "default_price_max")]
    pub price_max: f64,

    /// Display only, prices are not converted
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/best_model.onnx")
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("models/feature_names.json")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/input_errors.log")
}

fn default_price_min() -> f64 {
    MIN_PLAUSIBLE_PRICE
}

fn default_price_max() -> f64 {
    MAX_PLAUSIBLE_PRICE
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            schema_path: default_schema_path(),
            log_file: default_log_file(),
            model_sha256: None,
            price_min: default_price_min(),
            price_max: default_price_max(),
            currency: default_currency(),
        }
    }
}

impl PipelineConfig {
    /// Plausibility bounds, falling back to the historical range when the
    /// configured pair is unusable
    pub fn bounds(&self) -> PlausibilityBounds {
        let usable = self.price_min.is_finite()
            && self.price_max.is_finite()
            && self.price_min <= self.price_max;
        if usable {
            PlausibilityBounds::new(self.price_min, self.price_max)
        } else {
            warn!(
                price_min = self.price_min,
                price_max = self.price_max,
                "Invalid plausibility bounds, using defaults"
            );
            PlausibilityBounds::default()
        }
    }
}
