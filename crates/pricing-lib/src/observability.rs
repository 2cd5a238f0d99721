//! Observability infrastructure for the pricing pipeline
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcome counters, model version)
//! - Structured logging of pipeline lifecycle events with tracing

use crate::events::EventLogStats;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge_vec,
    GaugeVec, Histogram, IntCounter, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PipelineMetricsInner> = OnceLock::new();

struct PipelineMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    predictions_implausible_total: IntCounter,
    prediction_failures_total: IntCounter,
    input_rejections_total: IntCounter,
    event_log_entries: IntGaugeVec,
    model_info: GaugeVec,
}

impl PipelineMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "laptop_price_prediction_latency_seconds",
                "Time spent encoding and scoring a specification",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "laptop_price_predictions_total",
                "Total number of prices returned"
            )
            .expect("Failed to register predictions_total"),

            predictions_implausible_total: register_int_counter!(
                "laptop_price_predictions_implausible_total",
                "Prices returned outside the plausibility bounds"
            )
            .expect("Failed to register predictions_implausible_total"),

            prediction_failures_total: register_int_counter!(
                "laptop_price_prediction_failures_total",
                "Requests answered with prediction unavailable"
            )
            .expect("Failed to register prediction_failures_total"),

            input_rejections_total: register_int_counter!(
                "laptop_price_input_rejections_total",
                "Field values rejected during validation"
            )
            .expect("Failed to register input_rejections_total"),

            event_log_entries: register_int_gauge_vec!(
                "laptop_price_event_log_entries",
                "Entries recorded by the event log",
                &["severity"]
            )
            .expect("Failed to register event_log_entries"),

            model_info: register_gauge_vec!(
                "laptop_price_model_info",
                "Information about the currently loaded model",
                &["version"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Pipeline metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct PipelineMetrics {
    _private: (),
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PipelineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PipelineMetrics")
    }
}

impl PipelineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PipelineMetricsInner {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    /// Count a returned price
    pub fn inc_predictions(&self, plausible: bool) {
        self.inner().predictions_total.inc();
        if !plausible {
            self.inner().predictions_implausible_total.inc();
        }
    }

    pub fn inc_prediction_failures(&self) {
        self.inner().prediction_failures_total.inc();
    }

    pub fn inc_input_rejections(&self, count: usize) {
        self.inner().input_rejections_total.inc_by(count as u64);
    }

    /// Mirror the event log counters
    pub fn set_event_log_stats(&self, stats: EventLogStats) {
        let gauge = &self.inner().event_log_entries;
        gauge.with_label_values(&["warn"]).set(stats.warnings as i64);
        gauge.with_label_values(&["error"]).set(stats.errors as i64);
    }

    pub fn set_model_version(&self, version: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version])
            .set(1.0);
    }
}

/// Structured logger for pipeline lifecycle events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn log_startup(&self, version: &str, model_version: Option<&str>, schema_len: usize) {
        info!(
            event = "service_started",
            service = %self.service,
            service_version = %version,
            model_version = model_version.unwrap_or("none"),
            schema_columns = schema_len,
            "Laptop price service started"
        );
    }

    pub fn log_prediction(&self, price: f64, currency: &str, model_version: &str, latency_ms: f64) {
        info!(
            event = "prediction_generated",
            service = %self.service,
            price = price,
            currency = %currency,
            model_version = %model_version,
            latency_ms = latency_ms,
            "Generated price prediction"
        );
    }

    pub fn log_implausible(&self, price: f64, min: f64, max: f64) {
        warn!(
            event = "prediction_implausible",
            service = %self.service,
            price = price,
            min = min,
            max = max,
            "Prediction outside historical price range"
        );
    }

    pub fn log_artifact_failure(&self, artifact: &str, path: &str, error: &str) {
        error!(
            event = "artifact_load_failed",
            service = %self.service,
            artifact = %artifact,
            path = %path,
            error = %error,
            "Artifact could not be loaded, predictions unavailable"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Laptop price service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handles_share_registry() {
        let metrics = PipelineMetrics::new();
        let other = metrics.clone();

        metrics.observe_prediction_latency(0.002);
        metrics.inc_predictions(true);
        other.inc_predictions(false);
        other.inc_prediction_failures();
        metrics.inc_input_rejections(2);
        metrics.set_model_version("linear-v1");
        metrics.set_event_log_stats(EventLogStats {
            warnings: 3,
            errors: 1,
            ..Default::default()
        });

        let families = prometheus::gather();
        let names: Vec<&str> = families.iter().map(|f| f.get_name()).collect();
        assert!(names.contains(&"laptop_price_predictions_total"));
        assert!(names.contains(&"laptop_price_model_info"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("price-server");
        assert_eq!(logger.service(), "price-server");
    }
}
