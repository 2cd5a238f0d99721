//! Laptop price prediction library
//!
//! This crate provides the core functionality for:
//! - Normalizing raw laptop specifications (category aliasing, numeric coercion)
//! - Encoding specifications into the model's fixed feature layout
//! - Price prediction with plausibility checks
//! - An append-only event log of corrections and anomalies
//! - Health checks and observability

pub mod artifacts;
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod models;
pub mod normalize;
pub mod observability;
pub mod pipeline;
pub mod predictor;

pub use artifacts::ModelArtifacts;
pub use config::PipelineConfig;
pub use error::{FieldRejection, PipelineError, Rejection, Unavailable, UnavailableReason};
pub use events::{EventLogger, LogEntry, Severity};
pub use health::{Component, ComponentHealth, HealthRegistry, HealthReport, HealthStatus, Readiness};
pub use models::*;
pub use normalize::SpecificationValidator;
pub use observability::{PipelineMetrics, StructuredLogger};
pub use pipeline::{PipelineStatus, PricingPipeline};
pub use predictor::{PlausibilityBounds, PredictionResult};
