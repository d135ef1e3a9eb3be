use std::sync::Arc;

use serde_json::Value;

use crate::config::{parse_provider_model, LlmConfig};
use crate::error::{RemediaError, Result};
use crate::llm::api::LlmApiClient;
use crate::models::Turn;
use crate::retry::{with_retry, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Named JSON schema the model output is constrained to.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    pub name: String,
    pub description: Option<String>,
    pub schema: Value,
}

#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Option<Arc<LlmConfig>>,
    client: Option<LlmApiClient>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProvider")
            .field("backend", &self.backend)
            .field("retry", &self.retry)
            .finish()
    }
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>, retry: RetryPolicy) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAICompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    LlmBackend::Unavailable {
                        reason: format!("Unknown provider in model: {}", config.model),
                    }
                }
            }
        };

        if let LlmBackend::Unavailable { reason } = &backend {
            return Self::unavailable(reason);
        }

        let client = match LlmApiClient::new(config) {
            Ok(client) => client,
            Err(e) => return Self::unavailable(&e.to_string()),
        };

        tracing::info!(backend = ?backend, model = client.model(), "LLM provider initialized");

        Self {
            backend,
            config: Some(Arc::new(config.clone())),
            client: Some(client),
            retry,
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        tracing::warn!(reason, "LLM provider unavailable");
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
            client: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_deref()
    }

    /// Request knobs taken from the configuration.
    pub fn default_options(&self) -> CompletionOptions {
        match self.config() {
            Some(config) => CompletionOptions {
                temperature: Some(config.temperature),
                max_tokens: Some(config.max_tokens),
            },
            None => CompletionOptions::default(),
        }
    }

    /// Schema-constrained completion over the full conversation, retried on
    /// transient failures.
    pub async fn complete_structured(
        &self,
        messages: &[Turn],
        schema: &ResponseSchema,
    ) -> Result<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RemediaError::LlmUnavailable(self.unavailable_reason()))?;

        let options = self.default_options();
        with_retry(&self.retry, "llm.complete_structured", || {
            client.complete_structured(messages, schema, Some(&options))
        })
        .await
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "No LLM client available".to_string(),
        }
    }
}
