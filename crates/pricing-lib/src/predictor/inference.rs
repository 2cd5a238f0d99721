//! Regression model backends
//!
//! `OnnxRegressor` runs an exported ONNX graph through tract.
//! `LinearRegressor` evaluates a JSON coefficient table, which is handy for
//! small deployments and for exercising the pipeline without an ONNX file.

use super::schema::FeatureSchema;
use super::RegressionModel;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Inference latency above which a warning is emitted
const MAX_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX regression model executed with tract
pub struct OnnxRegressor {
    model: TractModel,
    width: usize,
    version: String,
}

impl OnnxRegressor {
    /// Load an ONNX model expecting a `[1, width]` f32 input
    pub fn new(model_bytes: &[u8], width: usize, version: impl Into<String>) -> Result<Self> {
        let model = Self::load_model(model_bytes, width)?;
        Ok(Self {
            model,
            width,
            version: version.into(),
        })
    }

    fn load_model(model_bytes: &[u8], width: usize) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, width]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    fn features_to_tensor(&self, features: &[f64]) -> Result<Tensor> {
        let data: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let array = tract_ndarray::Array2::from_shape_vec((1, self.width), data)
            .context("Feature vector does not match model input shape")?;
        Ok(array.into())
    }
}

impl RegressionModel for OnnxRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        let start = Instant::now();

        let input = self.features_to_tensor(features)?;
        let result = self.model.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;
        let view = output.to_array_view::<f32>()?;
        let price = view.iter().next().copied().context("Model output is empty")?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(price as f64)
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.width)
    }
}

#[derive(Debug, Deserialize)]
struct LinearArtifact {
    version: String,
    intercept: f64,
    coefficients: HashMap<String, f64>,
}

/// Linear model `intercept + sum(weight_i * x_i)` over schema columns
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    intercept: f64,
    weights: Vec<f64>,
    version: String,
}

impl LinearRegressor {
    pub fn new(intercept: f64, weights: Vec<f64>, version: impl Into<String>) -> Self {
        Self {
            intercept,
            weights,
            version: version.into(),
        }
    }

    /// Parse a JSON coefficient table and lay it out in schema order.
    ///
    /// Columns without a coefficient weigh zero; coefficients for columns the
    /// schema does not know are an error.
    pub fn from_json(bytes: &[u8], schema: &FeatureSchema) -> Result<Self> {
        let artifact: LinearArtifact =
            serde_json::from_slice(bytes).context("Failed to parse linear model artifact")?;

        let mut weights = vec![0.0; schema.len()];
        for (column, weight) in &artifact.coefficients {
            let i = schema
                .index_of(column)
                .with_context(|| format!("Coefficient for unknown column '{}'", column))?;
            weights[i] = *weight;
        }

        Ok(Self::new(artifact.intercept, weights, artifact.version))
    }
}

impl RegressionModel for LinearRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.weights.len() {
            anyhow::bail!(
                "Feature vector has {} values, expected {}",
                features.len(),
                self.weights.len()
            );
        }
        let dot: f64 = features
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum();
        Ok(self.intercept + dot)
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.weights.len())
    }
}
