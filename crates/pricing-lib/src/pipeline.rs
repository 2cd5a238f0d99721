//! End-to-end pricing: validate, encode, predict
//!
//! A [`PricingPipeline`] is built once from its artifacts and then shared
//! read-only across requests. Clones are cheap and share every artifact.

use crate::artifacts::ModelArtifacts;
use crate::config::PipelineConfig;
use crate::error::{FieldRejection, PipelineError, Unavailable, UnavailableReason};
use crate::events::EventLogger;
use crate::models::{NormalizedSpecification, RawSpecification};
use crate::normalize::SpecificationValidator;
use crate::observability::{PipelineMetrics, StructuredLogger};
use crate::predictor::{
    FeatureEncoder, FeatureSchema, PlausibilityBounds, PredictionResult, PricePredictor,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Snapshot of what the pipeline can currently do
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStatus {
    pub model_loaded: bool,
    pub model_version: Option<String>,
    /// Zero when no schema is loaded
    pub schema_len: usize,
    pub event_log_writable: bool,
}

#[derive(Clone)]
pub struct PricingPipeline {
    validator: SpecificationValidator,
    encoder: FeatureEncoder,
    predictor: PricePredictor,
    events: EventLogger,
    metrics: PipelineMetrics,
    logger: StructuredLogger,
    currency: String,
}

impl PricingPipeline {
    pub fn new(artifacts: ModelArtifacts, bounds: PlausibilityBounds, events: EventLogger) -> Self {
        let metrics = PipelineMetrics::new();
        if let Some(model) = &artifacts.model {
            metrics.set_model_version(model.version());
        }

        Self {
            validator: SpecificationValidator::new(events.clone()),
            encoder: FeatureEncoder::new(artifacts.schema),
            predictor: PricePredictor::new(artifacts.model, bounds, events.clone()),
            events,
            metrics,
            logger: StructuredLogger::new(env!("CARGO_PKG_NAME")),
            currency: "EUR".to_string(),
        }
    }

    /// Open the event log and load both artifacts named by `config`
    pub fn from_config(config: &PipelineConfig) -> Self {
        let events = EventLogger::new(&config.log_file);
        let artifacts = ModelArtifacts::load(config, &events);
        Self::new(artifacts, config.bounds(), events).with_currency(config.currency.clone())
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn events(&self) -> &EventLogger {
        &self.events
    }

    pub fn validator(&self) -> &SpecificationValidator {
        &self.validator
    }

    pub fn schema(&self) -> Option<&Arc<FeatureSchema>> {
        self.encoder.schema()
    }

    pub fn bounds(&self) -> PlausibilityBounds {
        self.predictor.bounds()
    }

    /// Validate every field of a raw specification, collecting all rejections
    pub fn validate(
        &self,
        raw: &RawSpecification,
    ) -> Result<NormalizedSpecification, Vec<FieldRejection>> {
        let result = self.validator.validate(raw);
        if let Err(rejections) = &result {
            self.metrics.inc_input_rejections(rejections.len());
        }
        self.metrics.set_event_log_stats(self.events.stats());
        result
    }

    /// Encode and score a validated specification
    pub fn predict(&self, spec: &NormalizedSpecification) -> Result<PredictionResult, Unavailable> {
        let start = Instant::now();
        let outcome = self.score(spec);
        let elapsed = start.elapsed();

        match &outcome {
            Ok(result) => {
                self.metrics.observe_prediction_latency(elapsed.as_secs_f64());
                self.metrics.inc_predictions(result.plausible);
                if !result.plausible {
                    let bounds = self.bounds();
                    self.logger.log_implausible(result.price, bounds.min, bounds.max);
                }
                self.logger.log_prediction(
                    result.price,
                    &self.currency,
                    &result.model_version,
                    elapsed.as_secs_f64() * 1000.0,
                );
            }
            Err(_) => self.metrics.inc_prediction_failures(),
        }
        self.metrics.set_event_log_stats(self.events.stats());

        outcome
    }

    fn score(&self, spec: &NormalizedSpecification) -> Result<PredictionResult, Unavailable> {
        let record = spec.to_string();

        if !self.predictor.is_loaded() {
            return Err(Unavailable::new(UnavailableReason::ModelNotLoaded));
        }

        let features = match self.encoder.encode(spec) {
            Ok(features) => features,
            Err(PipelineError::ConfigurationUnavailable(_)) => {
                return Err(Unavailable::new(UnavailableReason::SchemaNotLoaded));
            }
            Err(e) => {
                self.events
                    .error("Prediction", &record, format!("Encoding failure: {}", e));
                return Err(Unavailable::new(UnavailableReason::ModelFailure));
            }
        };

        self.predictor.predict(&features, &record)
    }

    /// Validate then predict in one call
    pub fn estimate(&self, raw: &RawSpecification) -> Result<PredictionResult, PipelineError> {
        let spec = self.validate(raw).map_err(PipelineError::InputRejected)?;
        Ok(self.predict(&spec)?)
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            model_loaded: self.predictor.is_loaded(),
            model_version: self.predictor.model_version().map(str::to_string),
            schema_len: self.schema().map(|s| s.len()).unwrap_or(0),
            event_log_writable: self.events.is_writable(),
        }
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rejection;
    use crate::models::CategoryField;
    use crate::predictor::{LinearRegressor, RegressionModel};
    use tempfile::TempDir;

    fn schema() -> Arc<FeatureSchema> {
        let columns = [
            "Inches",
            "Ram",
            "Weight",
            "SSD",
            "HDD",
            "Company_Apple",
            "Company_Hp",
            "OpSys_Windows 10",
            "Gpu_brand_Nvidia",
        ];
        Arc::new(FeatureSchema::new(columns.iter().map(|c| c.to_string()).collect()).unwrap())
    }

    fn linear(schema: &FeatureSchema, intercept: f64) -> Arc<dyn RegressionModel> {
        let json = format!(
            r#"{{"version": "linear-test", "intercept": {}, "coefficients": {{"Ram": 40.0, "SSD": 0.5, "Company_Apple": 600.0}}}}"#,
            intercept
        );
        Arc::new(LinearRegressor::from_json(json.as_bytes(), schema).unwrap())
    }

    fn pipeline(dir: &TempDir, intercept: Option<f64>) -> PricingPipeline {
        let schema = schema();
        let model = intercept.map(|i| linear(&schema, i));
        let events = EventLogger::new(dir.path().join("events.log"));
        PricingPipeline::new(
            ModelArtifacts::new(Some(schema), model),
            PlausibilityBounds::default(),
            events,
        )
    }

    fn log(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("events.log")).unwrap_or_default()
    }

    fn scenario_a() -> RawSpecification {
        RawSpecification::new()
            .with("Company", "HP")
            .with("TypeName", "Notebook")
            .with("Inches", 15.6)
            .with("Ram", 8i64)
            .with("Weight", 2.0)
            .with("OpSys", "Windows 11")
            .with("SSD", 512i64)
            .with("HDD", 0i64)
            .with("Hybrid", 0i64)
            .with("Flash_Storage", 0i64)
            .with("Cpu", "Intel")
            .with("Gpu", "Intel")
    }

    #[test]
    fn test_estimate_scenario_a() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, Some(300.0));

        let result = pipeline.estimate(&scenario_a()).unwrap();

        // 300 + 8 * 40 + 512 * 0.5
        assert_eq!(result.price, 876.0);
        assert!(result.plausible);
        assert_eq!(result.model_version, "linear-test");

        let log = log(&dir);
        assert!(log.contains("Field: Company | Value: 'HP'"));
        assert!(log.contains("Field: OpSys | Value: 'Windows 11'"));
    }

    #[test]
    fn test_estimate_collects_rejections() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, Some(300.0));
        let raw = scenario_a()
            .with("Ram", "9999")
            .with("Company", "Alienware");

        let err = pipeline.estimate(&raw).unwrap_err();

        let rejections = match err {
            PipelineError::InputRejected(rejections) => rejections,
            other => panic!("expected rejection, got {:?}", other),
        };
        assert_eq!(rejections.len(), 2);
        assert!(rejections
            .iter()
            .any(|r| r.field == "Ram" && r.reason == Rejection::TooHigh { max: 128.0 }));
        assert!(rejections
            .iter()
            .any(|r| r.field == "Company" && r.reason == Rejection::NotFound));
    }

    #[test]
    fn test_implausible_price_flagged() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, Some(-526.0));

        let result = pipeline.estimate(&scenario_a()).unwrap();

        assert_eq!(result.price, 50.0);
        assert!(!result.plausible);
        assert!(log(&dir).contains("Unrealistic prediction: 50.00"));
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, None);
        let spec = pipeline.validate(&scenario_a()).unwrap();

        let err = pipeline.predict(&spec).unwrap_err();
        assert_eq!(err.reason, UnavailableReason::ModelNotLoaded);

        let err = pipeline.estimate(&scenario_a()).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigurationUnavailable(_)));
    }

    #[test]
    fn test_from_config_without_artifacts() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            model_path: dir.path().join("none.onnx"),
            schema_path: dir.path().join("none.json"),
            log_file: dir.path().join("events.log"),
            currency: "USD".to_string(),
            ..Default::default()
        };

        let pipeline = PricingPipeline::from_config(&config);

        let status = pipeline.status();
        assert!(!status.model_loaded);
        assert_eq!(status.schema_len, 0);
        assert!(status.event_log_writable);
        assert_eq!(pipeline.currency(), "USD");

        let err = pipeline.predict(&NormalizedSpecification::default()).unwrap_err();
        assert_eq!(err.reason, UnavailableReason::ModelNotLoaded);
    }

    #[test]
    fn test_status_reports_loaded_artifacts() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, Some(0.0));

        let status = pipeline.status();
        assert!(status.model_loaded);
        assert_eq!(status.model_version.as_deref(), Some("linear-test"));
        assert_eq!(status.schema_len, schema().len());
    }

    #[test]
    fn test_defaults_predict() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, Some(300.0));

        let spec = pipeline.validate(&RawSpecification::new()).unwrap();
        assert_eq!(spec.category(CategoryField::Company), "Dell");

        // 300 + 8 * 40
        let result = pipeline.predict(&spec).unwrap();
        assert_eq!(result.price, 620.0);
    }
}
