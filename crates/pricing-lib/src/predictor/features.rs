//! Feature encoding for model inference
//!
//! Turns a specification record into the dummy-encoded vector the model was
//! trained on: rename form fields to training names, one-hot expand the
//! categorical values, then reindex against the fixed schema. A single-row
//! expansion never reproduces the full training column set, so the schema
//! alone decides the output shape.

use super::schema::FeatureSchema;
use crate::error::{FieldRejection, PipelineError, Rejection};
use crate::models::{FieldValue, NormalizedSpecification};
use std::sync::Arc;
use tracing::debug;

/// Form field names and their training-time equivalents
pub const FIELD_ALIASES: &[(&str, &str)] = &[("Cpu", "Cpu_brand"), ("Gpu", "Gpu_brand")];

/// Dense feature vector aligned to a [`FeatureSchema`]
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
    schema: Arc<FeatureSchema>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Value of a named column, if the schema has it
    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.index_of(column).map(|i| self.values[i])
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// `(column, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Rename a field to its training-time name
pub fn training_name(field: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(form, _)| *form == field)
        .map(|(_, training)| *training)
        .unwrap_or(field)
}

/// One-hot expansion: categorical values become `<field>_<value>` indicators,
/// numeric values pass through under their own name.
pub fn one_hot_expand(record: &[(String, FieldValue)]) -> Vec<(String, f64)> {
    record
        .iter()
        .map(|(field, value)| {
            let field = training_name(field);
            match value {
                FieldValue::Category(label) => (format!("{}_{}", field, label), 1.0),
                FieldValue::Number(n) => (field.to_string(), *n),
            }
        })
        .collect()
}

/// Encodes specifications against the loaded schema
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: Option<Arc<FeatureSchema>>,
}

impl FeatureEncoder {
    pub fn new(schema: Option<Arc<FeatureSchema>>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> Option<&Arc<FeatureSchema>> {
        self.schema.as_ref()
    }

    pub fn encode(&self, spec: &NormalizedSpecification) -> Result<FeatureVector, PipelineError> {
        self.encode_record(&spec.to_record())
    }

    /// Encode an arbitrary record; fails fast when no schema is loaded
    pub fn encode_record(
        &self,
        record: &[(String, FieldValue)],
    ) -> Result<FeatureVector, PipelineError> {
        let schema = self.schema.as_ref().ok_or_else(|| {
            PipelineError::ConfigurationUnavailable("feature schema not loaded".to_string())
        })?;

        let non_finite: Vec<FieldRejection> = record
            .iter()
            .filter(|(_, v)| matches!(v, FieldValue::Number(n) if !n.is_finite()))
            .map(|(field, _)| FieldRejection::new(training_name(field), Rejection::Unparseable))
            .collect();
        if !non_finite.is_empty() {
            return Err(PipelineError::InputRejected(non_finite));
        }

        let mut values = vec![0.0; schema.len()];
        let mut dropped = Vec::new();
        for (column, value) in one_hot_expand(record) {
            match schema.index_of(&column) {
                Some(i) => values[i] = value,
                None => dropped.push(column),
            }
        }

        if !dropped.is_empty() {
            debug!(columns = ?dropped, "Dropped columns absent from feature schema");
        }

        Ok(FeatureVector {
            values,
            schema: Arc::clone(schema),
        })
    }
}
