//! Feature schema: the ordered column list the model was trained against
//!
//! Loaded once at startup and shared read-only. Its length and order define
//! the shape and meaning of every feature vector.

use crate::error::PipelineError;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema, refusing empty or duplicated column lists
    pub fn new(columns: Vec<String>) -> Result<Self, PipelineError> {
        if columns.is_empty() {
            return Err(PipelineError::ConfigurationUnavailable(
                "feature schema has no columns".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(PipelineError::ConfigurationUnavailable(format!(
                    "feature schema lists column '{}' more than once",
                    name
                )));
            }
        }

        Ok(Self { columns, index })
    }

    /// Parse a JSON array of column names
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let columns: Vec<String> =
            serde_json::from_slice(bytes).context("Feature schema is not a JSON array of strings")?;
        Ok(Self::new(columns)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read feature schema {}", path.display()))?;
        Self::from_json(&bytes)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_preserves_order() {
        let schema = FeatureSchema::from_json(br#"["Inches", "Ram", "Company_Hp"]"#).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.index_of("Inches"), Some(0));
        assert_eq!(schema.index_of("Company_Hp"), Some(2));
        assert_eq!(schema.index_of("Company_Dell"), None);
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(FeatureSchema::new(Vec::new()).is_err());
        assert!(FeatureSchema::from_json(b"[]").is_err());
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = FeatureSchema::new(vec!["Ram".to_string(), "Ram".to_string()]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_non_array_rejected() {
        assert!(FeatureSchema::from_json(br#"{"columns": []}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = FeatureSchema::load(Path::new("/nonexistent/feature_names.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read feature schema"));
    }
}
