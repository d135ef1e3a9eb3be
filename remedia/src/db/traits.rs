use async_trait::async_trait;

use crate::error::Result;
use crate::models::{RemedyRecord, SymptomCorpusEntry};

/// Symptom id to remedy lookup.
#[async_trait]
pub trait RemedyStore: Send + Sync {
    /// Remedies for one symptom, degree descending then abbreviation ascending.
    /// An unknown id yields an empty list.
    async fn remedies_for(&self, symptom_id: i64) -> Result<Vec<RemedyRecord>>;

    /// Fails with `ResourceUnavailable` unless the lookup tables are reachable.
    async fn ping(&self) -> Result<()>;
}

/// Bulk source of the reference symptom corpus.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    async fn load_corpus(&self) -> Result<Vec<SymptomCorpusEntry>>;
}
