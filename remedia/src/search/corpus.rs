use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::db::CorpusStore;
use crate::error::{RemediaError, Result};
use crate::models::SymptomCorpusEntry;

/// Read-only symptom corpus shared by every session for the life of the process.
#[derive(Debug)]
pub struct SymptomCorpus {
    entries: Vec<SymptomCorpusEntry>,
    dimensions: usize,
}

impl SymptomCorpus {
    /// Rejects an empty corpus and rows whose dimensionality differs from the first row.
    pub fn new(entries: Vec<SymptomCorpusEntry>) -> Result<Self> {
        let Some(first) = entries.first() else {
            return Err(RemediaError::ResourceUnavailable(
                "Symptom corpus is empty".to_string(),
            ));
        };

        let dimensions = first.embedding.len();
        if dimensions == 0 {
            return Err(RemediaError::ResourceUnavailable(format!(
                "Symptom {} has an empty embedding",
                first.id
            )));
        }

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(RemediaError::ResourceUnavailable(format!(
                "Symptom {} has {} dimensions, expected {dimensions}",
                bad.id,
                bad.embedding.len()
            )));
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Load a JSON Lines snapshot, one `{id, category, path, embedding}` object per line.
    pub fn from_jsonl(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            RemediaError::ResourceUnavailable(format!(
                "Cannot open corpus snapshot {}: {e}",
                path.display()
            ))
        })?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: SymptomCorpusEntry = serde_json::from_str(&line).map_err(|e| {
                RemediaError::ResourceUnavailable(format!(
                    "Invalid corpus row at {}:{}: {e}",
                    path.display(),
                    index + 1
                ))
            })?;
            entries.push(entry);
        }

        let corpus = Self::new(entries)?;
        tracing::info!(
            path = %path.display(),
            entries = corpus.len(),
            dimensions = corpus.dimensions(),
            "Symptom corpus loaded from snapshot"
        );
        Ok(corpus)
    }

    pub async fn from_store(store: &dyn CorpusStore) -> Result<Self> {
        let corpus = Self::new(store.load_corpus().await?)?;
        tracing::info!(
            entries = corpus.len(),
            dimensions = corpus.dimensions(),
            "Symptom corpus loaded from database"
        );
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn entries(&self) -> &[SymptomCorpusEntry] {
        &self.entries
    }

    pub fn in_category<'a>(
        &'a self,
        label: &'a str,
    ) -> impl Iterator<Item = &'a SymptomCorpusEntry> + 'a {
        self.entries.iter().filter(move |e| e.category == label)
    }

    pub fn category_counts(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category.as_str()).or_insert(0) += 1;
        }
        counts
    }
}
