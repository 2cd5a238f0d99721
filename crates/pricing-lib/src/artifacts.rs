//! Startup loading of the model and feature schema artifacts
//!
//! Loading never aborts the process. An artifact that cannot be read,
//! parsed or verified is logged and left out, and the pipeline answers
//! every prediction with "unavailable" until it is fixed.

use crate::config::PipelineConfig;
use crate::events::EventLogger;
use crate::observability::StructuredLogger;
use crate::predictor::{FeatureSchema, LinearRegressor, OnnxRegressor, RegressionModel};
use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Hex characters of the checksum kept in derived model versions
const VERSION_HASH_LEN: usize = 12;

/// The constructed-once, read-only artifacts a pipeline runs against
#[derive(Clone, Default)]
pub struct ModelArtifacts {
    pub schema: Option<Arc<FeatureSchema>>,
    pub model: Option<Arc<dyn RegressionModel>>,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("schema_len", &self.schema.as_ref().map(|s| s.len()))
            .field("model", &self.model.as_ref().map(|m| m.version().to_string()))
            .finish()
    }
}

impl ModelArtifacts {
    pub fn new(schema: Option<Arc<FeatureSchema>>, model: Option<Arc<dyn RegressionModel>>) -> Self {
        Self { schema, model }
    }

    /// Load both artifacts named by `config`, logging each failure
    pub fn load(config: &PipelineConfig, events: &EventLogger) -> Self {
        let logger = StructuredLogger::new(env!("CARGO_PKG_NAME"));
        let schema_path = config.schema_path.display().to_string();
        let model_path = config.model_path.display().to_string();

        let schema = match FeatureSchema::load(&config.schema_path) {
            Ok(schema) => {
                info!(path = %schema_path, columns = schema.len(), "Loaded feature schema");
                Some(Arc::new(schema))
            }
            Err(e) => {
                let message = format!("{:#}", e);
                logger.log_artifact_failure("schema", &schema_path, &message);
                events.error("Schema", &schema_path, format!("Schema load failure: {}", message));
                None
            }
        };

        let model = match &schema {
            Some(schema) => {
                match load_model(&config.model_path, config.model_sha256.as_deref(), schema) {
                    Ok(model) => {
                        info!(
                            path = %model_path,
                            version = %model.version(),
                            "Loaded regression model"
                        );
                        Some(model)
                    }
                    Err(e) => {
                        let message = format!("{:#}", e);
                        logger.log_artifact_failure("model", &model_path, &message);
                        events.error("Model", &model_path, format!("Model load failure: {}", message));
                        None
                    }
                }
            }
            None => {
                let message = "feature schema unavailable";
                logger.log_artifact_failure("model", &model_path, message);
                events.error("Model", &model_path, format!("Model load failure: {}", message));
                None
            }
        };

        Self { schema, model }
    }

    pub fn is_complete(&self) -> bool {
        self.schema.is_some() && self.model.is_some()
    }
}

/// Read, verify and construct a model for `schema`.
///
/// The backend is chosen by extension: `.onnx` runs through tract, `.json`
/// is a linear coefficient table.
pub fn load_model(
    path: &Path,
    expected_sha256: Option<&str>,
    schema: &FeatureSchema,
) -> Result<Arc<dyn RegressionModel>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read model artifact {}", path.display()))?;

    let checksum = sha256_hex(&bytes);
    if let Some(expected) = expected_sha256 {
        verify_checksum(&checksum, expected)?;
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let model: Arc<dyn RegressionModel> = match extension.as_str() {
        "onnx" => {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("model");
            let version = format!("{}-{}", stem, &checksum[..VERSION_HASH_LEN]);
            Arc::new(OnnxRegressor::new(&bytes, schema.len(), version)?)
        }
        "json" => Arc::new(LinearRegressor::from_json(&bytes, schema)?),
        other => bail!("Unsupported model format '{}'", other),
    };

    if let Some(width) = model.input_width() {
        if width != schema.len() {
            bail!(
                "Model expects {} features but the schema has {}",
                width,
                schema.len()
            );
        }
    }

    Ok(model)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn verify_checksum(actual: &str, expected: &str) -> Result<()> {
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        bail!("Checksum mismatch: expected {}, got {}", expected.trim(), actual);
    }
    Ok(())
}
