use std::sync::Arc;

use crate::config::SearchConfig;
use crate::embeddings::EmbeddingProvider;
use crate::error::{RemediaError, Result};
use crate::models::RankedSymptom;
use crate::search::corpus::SymptomCorpus;
use crate::search::similarity::{normalize, rank};
use crate::taxonomy::{corpus_filter_label, SubCategory, UpperCategory};

/// Largest `top_n` a caller may request.
pub const MAX_TOP_N: usize = 1000;

/// Category-filtered nearest-neighbour search over the symptom corpus.
#[derive(Clone)]
pub struct SimilaritySearchEngine {
    corpus: Arc<SymptomCorpus>,
    embeddings: EmbeddingProvider,
    normalize_query: bool,
    default_top_n: usize,
}

impl SimilaritySearchEngine {
    pub fn new(corpus: Arc<SymptomCorpus>, embeddings: EmbeddingProvider, config: &SearchConfig) -> Self {
        Self {
            corpus,
            embeddings,
            normalize_query: config.normalize_query,
            default_top_n: config.top_n.clamp(1, MAX_TOP_N),
        }
    }

    pub fn corpus(&self) -> &SymptomCorpus {
        &self.corpus
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }

    pub fn embedding_model(&self) -> &str {
        self.embeddings.model()
    }

    /// Rank the corpus entries of the classified category against `query`.
    ///
    /// An empty category yields an empty list without calling the embedding
    /// provider.
    pub async fn search(
        &self,
        query: &str,
        upper: UpperCategory,
        sub: SubCategory,
        top_n: Option<usize>,
    ) -> Result<Vec<RankedSymptom>> {
        if query.trim().is_empty() {
            return Err(RemediaError::Validation("Search query cannot be empty".to_string()));
        }

        let top_n = match top_n {
            Some(n) if !(1..=MAX_TOP_N).contains(&n) => {
                return Err(RemediaError::Validation(format!(
                    "top_n must be between 1 and {MAX_TOP_N}, got {n}"
                )));
            }
            Some(n) => n,
            None => self.default_top_n,
        };

        let label = corpus_filter_label(upper, sub);
        if self.corpus.in_category(label).next().is_none() {
            tracing::info!(category = label, "No corpus entries in category");
            return Ok(Vec::new());
        }

        let mut query_embedding = self.embeddings.embed_query(query).await?;
        if query_embedding.len() != self.corpus.dimensions() {
            return Err(RemediaError::Embedding(format!(
                "Query embedding has {} dimensions, corpus has {}",
                query_embedding.len(),
                self.corpus.dimensions()
            )));
        }

        if self.normalize_query {
            normalize(&mut query_embedding);
        }

        let results = rank(self.corpus.in_category(label), &query_embedding, top_n);
        tracing::debug!(
            category = label,
            top_n,
            results = results.len(),
            "Similarity search completed"
        );
        Ok(results)
    }
}
