//! HTTP API: price prediction, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pricing_lib::{
    health::{HealthRegistry, HealthStatus},
    observability::PipelineMetrics,
    PipelineError, PredictionResult, PricingPipeline, RawSpecification,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PricingPipeline,
    pub health_registry: HealthRegistry,
    pub metrics: PipelineMetrics,
}

impl AppState {
    pub fn new(pipeline: PricingPipeline, health_registry: HealthRegistry) -> Self {
        Self {
            pipeline,
            health_registry,
            metrics: PipelineMetrics::new(),
        }
    }
}

/// Successful prediction body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub price: f64,
    pub plausible: bool,
    pub currency: String,
    pub model_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// One rejected field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionBody {
    pub field: String,
    pub reason: String,
}

/// Error body for 422 and 503 answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejections: Vec<RejectionBody>,
}

/// Loaded feature schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub count: usize,
    pub columns: Vec<String>,
}

fn prediction_response(state: &AppState, result: PredictionResult) -> PredictResponse {
    let currency = state.pipeline.currency().to_string();
    let warning = (!result.plausible).then(|| {
        let bounds = state.pipeline.bounds();
        format!(
            "Predicted price is outside the historical range of {} to {} {}",
            bounds.min, bounds.max, currency
        )
    });

    PredictResponse {
        price: result.price,
        plausible: result.plausible,
        currency,
        model_version: result.model_version,
        warning,
    }
}

fn error_response(err: PipelineError) -> Response {
    match err {
        PipelineError::InputRejected(rejections) => {
            let body = ErrorResponse {
                error: "Input rejected".to_string(),
                rejections: rejections
                    .iter()
                    .map(|r| RejectionBody {
                        field: r.field.clone(),
                        reason: r.reason.to_string(),
                    })
                    .collect(),
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
        other => {
            let body = ErrorResponse {
                error: other.user_message(),
                rejections: Vec::new(),
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

/// Score a raw specification
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<RawSpecification>,
) -> Response {
    match state.pipeline.estimate(&raw) {
        Ok(result) => (StatusCode::OK, Json(prediction_response(&state, result))).into_response(),
        Err(err) => error_response(err),
    }
}

/// Column names of the loaded feature schema
async fn schema(State(state): State<Arc<AppState>>) -> Response {
    match state.pipeline.schema() {
        Some(schema) => {
            let body = SchemaResponse {
                count: schema.len(),
                columns: schema.columns().to_vec(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        None => error_response(PipelineError::ConfigurationUnavailable(
            "feature schema not loaded".to_string(),
        )),
    }
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state
        .health_registry
        .observe(&state.pipeline.status())
        .await;
    let health = state.health_registry.report().await;

    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state
        .metrics
        .set_event_log_stats(state.pipeline.events().stats());

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/schema", get(schema))
        .route("/api/v1/predict", post(predict))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
