//! Prediction post-processing: rounding and plausibility checks

use super::features::FeatureVector;
use super::RegressionModel;
use crate::error::{Unavailable, UnavailableReason};
use crate::events::EventLogger;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Lowest price seen in the training data
pub const MIN_PLAUSIBLE_PRICE: f64 = 100.0;

/// Highest price seen in the training data
pub const MAX_PLAUSIBLE_PRICE: f64 = 6999.0;

/// Decimal places kept in returned prices
pub const PRICE_DECIMALS: i32 = 2;

/// Inclusive historical price range used to flag suspicious outputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibilityBounds {
    pub min: f64,
    pub max: f64,
}

impl PlausibilityBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PlausibilityBounds {
    fn default() -> Self {
        Self::new(MIN_PLAUSIBLE_PRICE, MAX_PLAUSIBLE_PRICE)
    }
}

/// Round to [`PRICE_DECIMALS`] places
pub fn round_price(value: f64) -> f64 {
    let scale = 10f64.powi(PRICE_DECIMALS);
    (value * scale).round() / scale
}

/// A successful prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Rounded price
    pub price: f64,
    /// Unrounded model output
    pub raw_price: f64,
    /// False when the price falls outside the plausibility bounds
    pub plausible: bool,
    pub model_version: String,
}

/// Runs the model and applies the plausibility policy
#[derive(Clone)]
pub struct PricePredictor {
    model: Option<Arc<dyn RegressionModel>>,
    bounds: PlausibilityBounds,
    events: EventLogger,
}

impl PricePredictor {
    pub fn new(
        model: Option<Arc<dyn RegressionModel>>,
        bounds: PlausibilityBounds,
        events: EventLogger,
    ) -> Self {
        Self {
            model,
            bounds,
            events,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_version(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.version())
    }

    pub fn bounds(&self) -> PlausibilityBounds {
        self.bounds
    }

    /// Score a feature vector.
    ///
    /// `record` describes the input for the event log. Model failures and
    /// non-finite outputs are logged and reported as [`Unavailable`].
    pub fn predict(
        &self,
        features: &FeatureVector,
        record: &str,
    ) -> Result<PredictionResult, Unavailable> {
        let Some(model) = self.model.as_deref() else {
            debug!("No model loaded, prediction unavailable");
            return Err(Unavailable::new(UnavailableReason::ModelNotLoaded));
        };

        let raw_price = match model.predict(features.as_slice()) {
            Ok(value) if value.is_finite() => value,
            Ok(value) => {
                self.events.error(
                    "Prediction",
                    record,
                    format!("Prediction failure: non-finite model output {}", value),
                );
                return Err(Unavailable::new(UnavailableReason::ModelFailure));
            }
            Err(e) => {
                self.events
                    .error("Prediction", record, format!("Prediction failure: {:#}", e));
                return Err(Unavailable::new(UnavailableReason::ModelFailure));
            }
        };

        let price = round_price(raw_price);
        let plausible = self.bounds.contains(price);
        if !plausible {
            self.events.warn(
                "Prediction",
                record,
                format!("Unrealistic prediction: {:.2}", price),
            );
        }

        Ok(PredictionResult {
            price,
            raw_price,
            plausible,
            model_version: model.version().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::schema::FeatureSchema;
    use crate::predictor::FeatureEncoder;
    use tempfile::TempDir;

    struct FixedModel(f64);

    impl RegressionModel for FixedModel {
        fn predict(&self, _features: &[f64]) -> anyhow::Result<f64> {
            Ok(self.0)
        }

        fn version(&self) -> &str {
            "fixed"
        }
    }

    struct BrokenModel;

    impl RegressionModel for BrokenModel {
        fn predict(&self, _features: &[f64]) -> anyhow::Result<f64> {
            anyhow::bail!("input tensor rank mismatch")
        }

        fn version(&self) -> &str {
            "broken"
        }
    }

    fn vector() -> FeatureVector {
        let schema = FeatureSchema::new(vec!["Ram".to_string()]).unwrap();
        FeatureEncoder::new(Some(Arc::new(schema)))
            .encode_record(&[])
            .unwrap()
    }

    fn predictor(model: Option<Arc<dyn RegressionModel>>) -> (TempDir, PricePredictor) {
        let dir = TempDir::new().unwrap();
        let events = EventLogger::new(dir.path().join("events.log"));
        let predictor = PricePredictor::new(model, PlausibilityBounds::default(), events);
        (dir, predictor)
    }

    fn log(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("events.log")).unwrap_or_default()
    }

    #[test]
    fn test_rounds_to_two_places() {
        let (_dir, predictor) = predictor(Some(Arc::new(FixedModel(1234.5678))));
        let result = predictor.predict(&vector(), "{}").unwrap();
        assert_eq!(result.price, 1234.57);
        assert_eq!(result.raw_price, 1234.5678);
        assert!(result.plausible);
        assert_eq!(result.model_version, "fixed");
    }

    #[test]
    fn test_implausible_price_still_returned() {
        let (dir, predictor) = predictor(Some(Arc::new(FixedModel(50.0))));
        let result = predictor.predict(&vector(), "{Company: 'Hp'}").unwrap();

        assert_eq!(result.price, 50.0);
        assert!(!result.plausible);
        let log = log(&dir);
        assert!(log.contains("WARN | Field: Prediction | Value: '{Company: 'Hp'}' | Unrealistic prediction: 50.00"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = PlausibilityBounds::default();
        assert!(bounds.contains(100.0));
        assert!(bounds.contains(6999.0));
        assert!(!bounds.contains(99.99));
        assert!(!bounds.contains(6999.01));
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        let (dir, predictor) = predictor(None);
        let err = predictor.predict(&vector(), "{}").unwrap_err();
        assert_eq!(err.reason, UnavailableReason::ModelNotLoaded);
        assert!(log(&dir).is_empty());
    }

    #[test]
    fn test_model_failure_is_logged_and_unavailable() {
        let (dir, predictor) = predictor(Some(Arc::new(BrokenModel)));
        let err = predictor.predict(&vector(), "{Ram: 8}").unwrap_err();

        assert_eq!(err.reason, UnavailableReason::ModelFailure);
        assert!(!err.to_string().contains("tensor"));
        let log = log(&dir);
        assert!(log.contains("ERROR | Field: Prediction | Value: '{Ram: 8}' | Prediction failure: input tensor rank mismatch"));
    }

    #[test]
    fn test_nan_output_is_unavailable() {
        let (_dir, predictor) = predictor(Some(Arc::new(FixedModel(f64::NAN))));
        let err = predictor.predict(&vector(), "{}").unwrap_err();
        assert_eq!(err.reason, UnavailableReason::ModelFailure);
    }
}
