use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{RemediaError, Result};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimensions: Option<usize>,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// OpenAI-compatible `/embeddings` client. One HTTP request per call.
#[derive(Clone)]
pub struct EmbeddingApiClient {
    client: Client,
    config: ApiConfig,
}

impl EmbeddingApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemediaError::Embedding(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts.to_vec(),
            dimensions: self.config.dimensions,
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = self.config.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|e| RemediaError::Embedding(format!("Invalid API key header: {e}")))?,
            );
        }

        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));

        let resp = self
            .client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| RemediaError::TransientProvider(format!("Embedding request failed: {e}")))?;

        let status = resp.status();

        if status.is_success() {
            let body: EmbeddingResponse = resp.json().await.map_err(|e| {
                RemediaError::Embedding(format!("Failed to parse response: {e}"))
            })?;
            return Self::into_vectors(body, texts.len());
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(RemediaError::TransientProvider(format!(
                "Embedding rate limit exceeded (retry-after: {})",
                retry_after.as_deref().unwrap_or("unset")
            )));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemediaError::Embedding(format!(
                "Embedding authentication failed: {body}"
            )));
        }

        let body = resp.text().await.unwrap_or_default();

        if status.is_server_error() {
            return Err(RemediaError::TransientProvider(format!(
                "Embedding server error {status}: {body}"
            )));
        }

        Err(RemediaError::Embedding(format!("API error {status}: {body}")))
    }

    fn into_vectors(mut body: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
        if body.data.len() != expected {
            return Err(RemediaError::Embedding(format!(
                "Expected {expected} embeddings, got {}",
                body.data.len()
            )));
        }

        if body.data.iter().all(|d| d.index.is_some()) {
            body.data.sort_by_key(|d| d.index);
        }

        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}
