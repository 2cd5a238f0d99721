//! Liveness and readiness for the price service
//!
//! The service tracks three artifacts: the model, the feature schema and the
//! event log. A missing artifact degrades the service instead of failing it,
//! since prediction requests are still answered with "unavailable".

use crate::pipeline::PipelineStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A tracked part of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Model,
    Schema,
    EventLog,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Model, Component::Schema, Component::EventLog];

    pub fn name(self) -> &'static str {
        match self {
            Component::Model => "model",
            Component::Schema => "schema",
            Component::EventLog => "event_log",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered from best to worst so the overall status is the maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Answering requests, but predictions may be unavailable
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_operational(self) -> bool {
        self != HealthStatus::Unhealthy
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl ComponentHealth {
    fn with(status: HealthStatus, detail: Option<String>) -> Self {
        Self {
            status,
            detail,
            checked_at: Utc::now(),
        }
    }

    pub fn healthy() -> Self {
        Self::with(HealthStatus::Healthy, None)
    }

    pub fn degraded(detail: impl Into<String>) -> Self {
        Self::with(HealthStatus::Degraded, Some(detail.into()))
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        Self::with(HealthStatus::Unhealthy, Some(detail.into()))
    }
}

/// Body of the liveness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    pub components: BTreeMap<Component, ComponentHealth>,
}

/// Body of the readiness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Readiness {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    components: BTreeMap<Component, ComponentHealth>,
    model_version: Option<String>,
    ready: bool,
}

/// Shared view of component health, cheap to clone into handlers
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive every component's health from the pipeline state
    pub async fn observe(&self, status: &PipelineStatus) {
        let model = match &status.model_version {
            Some(_) if status.model_loaded => ComponentHealth::healthy(),
            _ => ComponentHealth::degraded("Model artifact not loaded"),
        };
        let schema = if status.schema_len > 0 {
            ComponentHealth::healthy()
        } else {
            ComponentHealth::degraded("Feature schema not loaded")
        };
        let event_log = if status.event_log_writable {
            ComponentHealth::healthy()
        } else {
            ComponentHealth::degraded("Event log is not writable")
        };

        let mut state = self.state.write().await;
        state.components.insert(Component::Model, model);
        state.components.insert(Component::Schema, schema);
        state.components.insert(Component::EventLog, event_log);
        state.model_version = status.model_version.clone();
    }

    /// Override one component, e.g. after a runtime failure
    pub async fn mark(&self, component: Component, health: ComponentHealth) {
        self.state.write().await.components.insert(component, health);
    }

    pub async fn set_ready(&self, ready: bool) {
        self.state.write().await.ready = ready;
    }

    pub async fn report(&self) -> HealthReport {
        let state = self.state.read().await;
        let status = state
            .components
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        HealthReport {
            status,
            model_version: state.model_version.clone(),
            components: state.components.clone(),
        }
    }

    pub async fn readiness(&self) -> Readiness {
        let ready = self.state.read().await.ready;
        if !ready {
            return Readiness {
                ready: false,
                reason: Some("Service not yet initialized".to_string()),
            };
        }

        let report = self.report().await;
        match report
            .components
            .iter()
            .find(|(_, health)| !health.status.is_operational())
        {
            Some((component, _)) => Readiness {
                ready: false,
                reason: Some(format!("Component '{}' is unhealthy", component)),
            },
            None => Readiness {
                ready: true,
                reason: None,
            },
        }
    }
}
