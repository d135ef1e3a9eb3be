use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::state::AppState;
use crate::config::{Config, EmbeddingsConfig};
use crate::db::RemedyStore;
use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::llm::{ClassifierSeed, LlmProvider};
use crate::models::{RemedyRecord, SymptomCorpusEntry};
use crate::retry::RetryPolicy;
use crate::search::{SimilaritySearchEngine, SymptomCorpus};
use crate::services::{Classifier, SessionRegistry, TriageService};

/// In-memory remedy table keyed by symptom id.
#[derive(Default)]
pub(crate) struct StaticRemedies(pub HashMap<i64, Vec<RemedyRecord>>);

#[async_trait]
impl RemedyStore for StaticRemedies {
    async fn remedies_for(&self, symptom_id: i64) -> Result<Vec<RemedyRecord>> {
        Ok(self.0.get(&symptom_id).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// State with no LLM and an embedding endpoint nothing listens on.
pub(crate) fn test_state(api_keys: Vec<String>) -> AppState {
    let mut config = Config::default();
    config.server.api_keys = api_keys;

    let corpus = SymptomCorpus::new(vec![SymptomCorpusEntry {
        id: 42,
        category: "Schlaf".to_string(),
        path: "Schlaf, Schlaflosigkeit, Mitternacht, nach".to_string(),
        embedding: vec![1.0, 0.0],
    }])
    .expect("corpus");

    let embeddings = EmbeddingProvider::new(
        &EmbeddingsConfig {
            model: "openai/text-embedding-3-small".to_string(),
            dimensions: None,
            api_key: Some("test-key".to_string()),
            base_url: Some("http://127.0.0.1:9/v1".to_string()),
            timeout_secs: 1,
        },
        RetryPolicy::fast(1),
    )
    .expect("embedding provider");

    let classifier = Classifier::new(
        LlmProvider::unavailable("not configured in tests"),
        ClassifierSeed::builtin().expect("seed"),
    );
    let engine = SimilaritySearchEngine::new(Arc::new(corpus), embeddings, &config.search);
    let remedies: Arc<dyn RemedyStore> = Arc::new(StaticRemedies::default());

    let triage = TriageService::new(
        classifier,
        engine,
        remedies.clone(),
        SessionRegistry::new(8),
        ',',
    );

    AppState::new(config, remedies, triage)
}
