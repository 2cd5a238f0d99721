//! Error types for the pricing pipeline

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a single raw field value was refused
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Empty input and no default configured for the field
    Empty,
    /// Nothing numeric could be extracted from the input
    Unparseable,
    /// Coerced value below the field minimum
    TooLow { min: f64 },
    /// Coerced value above the field maximum
    TooHigh { max: f64 },
    /// Categorical value with no exact or alias match
    NotFound,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => write!(f, "Value is required"),
            Rejection::Unparseable => write!(f, "Not a valid number"),
            Rejection::TooLow { min } => write!(f, "Too low (min {})", min),
            Rejection::TooHigh { max } => write!(f, "Too high (max {})", max),
            Rejection::NotFound => write!(f, "Not a recognized choice"),
        }
    }
}

/// A rejection tied to the field it was raised for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRejection {
    pub field: String,
    pub reason: Rejection,
}

impl FieldRejection {
    pub fn new(field: impl Into<String>, reason: Rejection) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl fmt::Display for FieldRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors surfaced by the pricing pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// One or more fields failed normalization or validation
    #[error("Input rejected: {}", join_rejections(.0))]
    InputRejected(Vec<FieldRejection>),

    /// Model or feature schema artifact is missing
    #[error("Configuration unavailable: {0}")]
    ConfigurationUnavailable(String),

    /// The model failed while scoring a request
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),
}

fn join_rejections(rejections: &[FieldRejection]) -> String {
    rejections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cause behind an unavailable prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    ModelNotLoaded,
    SchemaNotLoaded,
    ModelFailure,
}

/// A prediction could not be produced for this request.
///
/// The display text is safe to show to end users; details stay in the event log.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Price prediction is unavailable right now. Please try again later.")]
pub struct Unavailable {
    pub reason: UnavailableReason,
}

impl Unavailable {
    pub fn new(reason: UnavailableReason) -> Self {
        Self { reason }
    }
}

impl From<Unavailable> for PipelineError {
    fn from(err: Unavailable) -> Self {
        match err.reason {
            UnavailableReason::ModelNotLoaded => {
                PipelineError::ConfigurationUnavailable("model artifact not loaded".to_string())
            }
            UnavailableReason::SchemaNotLoaded => {
                PipelineError::ConfigurationUnavailable("feature schema not loaded".to_string())
            }
            UnavailableReason::ModelFailure => {
                PipelineError::ModelInvocation("model failed to score the request".to_string())
            }
        }
    }
}

impl PipelineError {
    /// Message suitable for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::InputRejected(rejections) => {
                format!("Please check your inputs: {}", join_rejections(rejections))
            }
            PipelineError::ConfigurationUnavailable(_) | PipelineError::ModelInvocation(_) => {
                Unavailable::new(UnavailableReason::ModelFailure).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Rejection::TooLow { min: 2.0 }.to_string(), "Too low (min 2)");
        assert_eq!(Rejection::TooHigh { max: 0.5 }.to_string(), "Too high (max 0.5)");
    }

    #[test]
    fn test_unavailable_maps_to_pipeline_error() {
        let err: PipelineError = Unavailable::new(UnavailableReason::SchemaNotLoaded).into();
        assert!(matches!(err, PipelineError::ConfigurationUnavailable(_)));

        let err: PipelineError = Unavailable::new(UnavailableReason::ModelFailure).into();
        assert!(matches!(err, PipelineError::ModelInvocation(_)));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = PipelineError::ModelInvocation("tensor shape [1, 40] mismatch".to_string());
        assert!(!err.user_message().contains("tensor"));
    }

    #[test]
    fn test_input_rejected_lists_fields() {
        let err = PipelineError::InputRejected(vec![
            FieldRejection::new("Ram", Rejection::TooHigh { max: 128.0 }),
            FieldRejection::new("Company", Rejection::NotFound),
        ]);
        let text = err.to_string();
        assert!(text.contains("Ram: Too high (max 128)"));
        assert!(text.contains("Company: Not a recognized choice"));
    }
}
