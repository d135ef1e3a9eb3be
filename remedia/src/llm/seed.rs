//! Seed conversation for the classifier.
//!
//! The system instruction and the few-shot exchanges are data, not code: the
//! built-in copy is compiled from `assets/classifier_seed.json` and can be
//! replaced at runtime through `CLASSIFIER_SEED_PATH`. The exchanges include a
//! correction turn teaching that the word "Körper" never belongs in a search
//! path; the model is expected to generalize from it.

use std::path::Path;

use serde::Deserialize;

use crate::config::LlmConfig;
use crate::error::{RemediaError, Result};
use crate::models::ConversationState;

const BUILTIN_SEED: &str = include_str!("../../assets/classifier_seed.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedExchange {
    pub user: String,
    pub assistant: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassifierSeed {
    pub version: u32,
    pub system_prompt: String,
    #[serde(default)]
    pub examples: Vec<SeedExchange>,
}

impl ClassifierSeed {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SEED)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let seed: Self = serde_json::from_str(json)?;

        if seed.system_prompt.trim().is_empty() {
            return Err(RemediaError::Validation(
                "Classifier seed has an empty system prompt".to_string(),
            ));
        }

        if let Some(index) = seed
            .examples
            .iter()
            .position(|e| e.user.trim().is_empty() || e.assistant.trim().is_empty())
        {
            return Err(RemediaError::Validation(format!(
                "Classifier seed example {index} has an empty turn"
            )));
        }

        Ok(seed)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Seed configured for this deployment: the override file if set, else the built-in one.
    pub fn load(config: &LlmConfig) -> Result<Self> {
        let seed = match config.seed_path.as_deref() {
            Some(path) => {
                tracing::info!(path, "Loading classifier seed override");
                Self::from_file(path)?
            }
            None => Self::builtin()?,
        };

        tracing::debug!(
            version = seed.version,
            examples = seed.examples.len(),
            "Classifier seed loaded"
        );
        Ok(seed)
    }

    /// Fresh conversation: system turn followed by every example exchange.
    pub fn conversation(&self) -> ConversationState {
        let mut conversation = ConversationState::new(self.system_prompt.clone());
        for example in &self.examples {
            conversation.append_exchange(example.user.clone(), example.assistant.clone());
        }
        conversation
    }
}
