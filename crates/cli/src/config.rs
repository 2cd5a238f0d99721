//! Configuration management for the CLI

use anyhow::{Context, Result};
use pricing_lib::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;
use crate::Cli;

/// Defaults read from `~/.config/lpp/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Price server URL
    pub api_url: Option<String>,
    pub model_path: Option<PathBuf>,
    pub schema_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    /// Display currency
    pub currency: Option<String>,
    /// Default output format ("table" or "json")
    pub default_format: Option<String>,
}

/// Effective settings after merging flags, environment and the config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: Option<String>,
    pub pipeline: PipelineConfig,
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from the default location, if present
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("lpp").join("config.json"))
    }

    /// Merge with command-line values; flags and environment win
    pub fn resolve(&self, cli: &Cli) -> Settings {
        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            model_path: pick(&cli.model_path, &self.model_path, defaults.model_path),
            schema_path: pick(&cli.schema_path, &self.schema_path, defaults.schema_path),
            log_file: pick(&cli.log_file, &self.log_file, defaults.log_file),
            currency: self.currency.clone().unwrap_or(defaults.currency),
            ..PipelineConfig::default()
        };

        let format = cli.format.unwrap_or_else(|| {
            match self.default_format.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("json") => OutputFormat::Json,
                _ => OutputFormat::Table,
            }
        });

        Settings {
            api_url: cli.api_url.clone().or_else(|| self.api_url.clone()),
            pipeline,
            format,
        }
    }
}

fn pick(flag: &Option<PathBuf>, file: &Option<PathBuf>, default: PathBuf) -> PathBuf {
    flag.clone().or_else(|| file.clone()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
        assert!(config.model_path.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"model_path": "/opt/lpp/model.json", "schema_path": "/opt/lpp/features.json", "currency": "USD", "default_format": "json"}"#,
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();

        let cli = Cli::parse_from(["lpp", "--model-path", "/tmp/other.onnx", "schema"]);
        let settings = config.resolve(&cli);

        assert_eq!(settings.pipeline.model_path, PathBuf::from("/tmp/other.onnx"));
        assert_eq!(
            settings.pipeline.schema_path,
            PathBuf::from("/opt/lpp/features.json")
        );
        assert_eq!(settings.pipeline.log_file, PathBuf::from("logs/input_errors.log"));
        assert_eq!(settings.pipeline.currency, "USD");
        assert!(matches!(settings.format, OutputFormat::Json));
    }

    #[test]
    fn test_invalid_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
