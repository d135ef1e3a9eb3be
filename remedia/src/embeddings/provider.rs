use crate::config::{default_base_url, parse_provider_model, provider_needs_api_key, EmbeddingsConfig};
use crate::error::{RemediaError, Result};
use crate::retry::{with_retry, RetryPolicy};

use super::api::{ApiConfig, EmbeddingApiClient};

/// Remote text embedding with bounded retries.
#[derive(Clone)]
pub struct EmbeddingProvider {
    client: EmbeddingApiClient,
    retry: RetryPolicy,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig, retry: RetryPolicy) -> Result<Self> {
        let (provider, model_name) = parse_provider_model(&config.model);

        if provider == "local" && config.base_url.is_none() {
            return Err(RemediaError::Embedding(format!(
                "Embedding model '{}' needs a provider prefix or EMBEDDING_BASE_URL",
                config.model
            )));
        }

        if provider_needs_api_key(provider) && config.api_key.is_none() {
            return Err(RemediaError::Embedding(format!(
                "API key required for embedding provider '{provider}'"
            )));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let client = EmbeddingApiClient::new(ApiConfig {
            base_url,
            api_key: config.api_key.clone(),
            model: model_name.to_string(),
            dimensions: config.dimensions,
            timeout_secs: config.timeout_secs,
        })?;

        tracing::info!(
            provider,
            model = model_name,
            dimensions = ?config.dimensions,
            "Embedding provider initialized"
        );

        Ok(Self { client, retry })
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        with_retry(&self.retry, "embeddings.embed", || self.client.embed(texts)).await
    }

    /// Embed one query string as a single-item batch.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemediaError::Embedding("No embedding generated".to_string()))
    }
}
