//! API client for communicating with the price server

use anyhow::{Context, Result};
use pricing_lib::RawSpecification;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// API client for the price server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// Prediction outcomes the server reports as structured errors
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("{message}")]
    Rejected {
        message: String,
        rejections: Vec<RejectionBody>,
    },

    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Send a raw specification for scoring
    pub async fn predict(&self, spec: &RawSpecification) -> Result<PredictResponse, PredictError> {
        let url = self.base_url.join("api/v1/predict").context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(spec)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if status.is_success() {
            return Ok(response
                .json()
                .await
                .context("Failed to parse response")?);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ErrorResponse> = serde_json::from_str(&body).ok();
        match (status, parsed) {
            (StatusCode::UNPROCESSABLE_ENTITY, Some(err)) if !err.rejections.is_empty() => {
                Err(PredictError::Rejected {
                    message: err.error,
                    rejections: err.rejections,
                })
            }
            (StatusCode::SERVICE_UNAVAILABLE, Some(err)) => Err(PredictError::Unavailable(err.error)),
            _ => Err(anyhow::anyhow!("API error ({}): {}", status, body).into()),
        }
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub price: f64,
    pub plausible: bool,
    pub currency: String,
    pub model_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionBody {
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub rejections: Vec<RejectionBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub count: usize,
    pub columns: Vec<String>,
}
