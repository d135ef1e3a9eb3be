use std::sync::Arc;

use crate::error::{RemediaError, Result};
use crate::llm::{ClassifierSeed, LlmProvider, ResponseSchema};
use crate::models::{
    classification_schema, ClassificationOutcome, ClassificationResult, ConversationState,
    CLASSIFICATION_SCHEMA_NAME,
};

/// Schema-constrained symptom classification over a running conversation.
#[derive(Clone)]
pub struct Classifier {
    llm: LlmProvider,
    seed: Arc<ClassifierSeed>,
    schema: Arc<ResponseSchema>,
}

impl Classifier {
    pub fn new(llm: LlmProvider, seed: ClassifierSeed) -> Self {
        Self {
            llm,
            seed: Arc::new(seed),
            schema: Arc::new(ResponseSchema {
                name: CLASSIFICATION_SCHEMA_NAME.to_string(),
                description: Some(
                    "Ober- und Unterkategorie sowie Suchpfad eines Symptoms im Synthesis"
                        .to_string(),
                ),
                schema: classification_schema(),
            }),
        }
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_available()
    }

    pub fn llm(&self) -> &LlmProvider {
        &self.llm
    }

    /// Seeded conversation for a new session.
    pub fn fresh_conversation(&self) -> ConversationState {
        self.seed.conversation()
    }

    /// Classify `user_text` in the context of `conversation`.
    ///
    /// Used both for a new symptom and for free-text feedback on the previous
    /// answer. On success the user text and the raw answer are appended to the
    /// conversation; on any error it is left untouched.
    pub async fn classify(
        &self,
        conversation: &mut ConversationState,
        user_text: &str,
    ) -> Result<ClassificationOutcome> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(RemediaError::Validation(
                "Symptom text cannot be empty".to_string(),
            ));
        }

        let messages = conversation.with_pending_user(user_text);
        let raw = self.llm.complete_structured(&messages, &self.schema).await?;
        let result = ClassificationResult::parse(&raw)?;

        conversation.append_exchange(user_text, raw.clone());

        tracing::info!(
            upper_category = %result.upper_category,
            sub_category = %result.sub_category,
            turns = conversation.len(),
            "Symptom classified"
        );

        Ok(ClassificationOutcome { result, raw })
    }
}
