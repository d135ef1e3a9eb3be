use serde::{Deserialize, Serialize};

/// One pre-indexed repertory rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomCorpusEntry {
    pub id: i64,
    pub category: String,
    pub path: String,
    pub embedding: Vec<f32>,
}

/// A corpus entry scored against a query embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RankedSymptom {
    pub id: i64,
    pub category: String,
    pub path: String,
    pub similarity: f32,
}

impl RankedSymptom {
    pub fn from_entry(entry: &SymptomCorpusEntry, similarity: f32) -> Self {
        Self {
            id: entry.id,
            category: entry.category.clone(),
            path: entry.path.clone(),
            similarity,
        }
    }
}
