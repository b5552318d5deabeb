use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for the remote embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Caller-supplied API key.
    pub api_key: String,

    /// Model name (e.g. `"text-embedding-3-small"`).
    pub model: String,

    /// Target dimensionality. When omitted, resolved from the model name.
    #[serde(default)]
    pub dimensions: Option<usize>,

    /// Endpoint base URL (OpenAI-compatible `/embeddings` route).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl RemoteConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("api_key must not be empty".into());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".into());
        }
        if self.dimensions == Some(0) {
            return Err("dimensions must be > 0 when set".into());
        }
        Ok(())
    }
}

/// Embedding provider calling an OpenAI-compatible embeddings endpoint.
pub struct RemoteProvider {
    client: reqwest::Client,
    config: RemoteConfig,
    dimensions: usize,
}

impl RemoteProvider {
    /// Create a provider from configuration.
    pub fn new(config: RemoteConfig) -> Result<Self, EmbeddingError> {
        config
            .validate()
            .map_err(EmbeddingError::ModelInitialization)?;

        let dimensions = config
            .dimensions
            .unwrap_or_else(|| default_dimensions(&config.model));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            dimensions,
        })
    }
}

/// Known model dimensionalities, used when the caller does not pin one.
fn default_dimensions(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        "text-embedding-ada-002" => 1536,
        _ => 1536,
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteProvider {
    fn name(&self) -> &str {
        "remote"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!("Remote embedding request ({} chars)", text.len());

        let mut body = serde_json::json!({
            "model": self.config.model,
            "input": [text],
        });
        if self.config.dimensions.is_some() {
            body["dimensions"] = serde_json::json!(self.dimensions);
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_api_failure(status.as_u16(), &detail));
        }

        let json: serde_json::Value = response.json().await?;
        parse_embedding_response(&json)
    }
}

/// Map HTTP failures onto the actionable error categories.
fn classify_api_failure(status: u16, detail: &str) -> EmbeddingError {
    let lowered = detail.to_lowercase();

    if status == 401 {
        return EmbeddingError::InvalidApiKey(truncate_detail(detail));
    }

    if lowered.contains("location") || lowered.contains("region") || lowered.contains("country") {
        return EmbeddingError::RegionRestricted(truncate_detail(detail));
    }

    if status == 403 {
        return EmbeddingError::InvalidApiKey(truncate_detail(detail));
    }

    EmbeddingError::Api(format!("HTTP {status}: {}", truncate_detail(detail)))
}

fn truncate_detail(detail: &str) -> String {
    let trimmed = detail.trim();
    if trimmed.is_empty() {
        return "(no response body)".to_string();
    }
    trimmed.chars().take(300).collect()
}

fn parse_embedding_response(json: &serde_json::Value) -> Result<Vec<f32>, EmbeddingError> {
    let embedding = json
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|arr| arr.first())
        .and_then(|item| item.get("embedding"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| EmbeddingError::Api("Malformed response: missing data[0].embedding".into()))?;

    Ok(embedding
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect())
}
