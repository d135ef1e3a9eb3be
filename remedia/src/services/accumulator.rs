use std::collections::HashMap;

use crate::models::{AggregatedRemedy, Remedy, RemedyRecord};

/// Remedies collected across every symptom selected in a session.
///
/// Entries keep their symptom provenance, so the same abbreviation may occur
/// several times. Merging happens only in [`ResultAccumulator::aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultAccumulator {
    entries: Vec<Remedy>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every remedy with `symptom_id` and append. Returns the number added.
    pub fn add(&mut self, remedies: Vec<RemedyRecord>, symptom_id: i64) -> usize {
        let added = remedies.len();
        self.entries
            .extend(remedies.into_iter().map(|remedy| remedy.tagged(symptom_id)));
        added
    }

    /// Drop every entry tagged with `symptom_id`. Returns the number removed.
    pub fn remove(&mut self, symptom_id: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.symptom_id != symptom_id);
        before - self.entries.len()
    }

    pub fn contains_symptom(&self, symptom_id: i64) -> bool {
        self.entries.iter().any(|entry| entry.symptom_id == symptom_id)
    }

    pub fn entries(&self) -> &[Remedy] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Group by abbreviation, counting entries and summing degrees.
    ///
    /// Sorted by occurrence descending, then degree sum descending, then
    /// abbreviation. The description of the earliest current entry wins.
    pub fn aggregate(&self) -> Vec<AggregatedRemedy> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut rows: Vec<AggregatedRemedy> = Vec::new();

        for entry in &self.entries {
            match index.get(entry.abbreviation.as_str()) {
                Some(&position) => {
                    let row = &mut rows[position];
                    row.total_occurrence += 1;
                    row.total_degree += entry.degree;

                    if row.description != entry.description {
                        tracing::warn!(
                            abbreviation = %entry.abbreviation,
                            kept = %row.description,
                            ignored = %entry.description,
                            symptom_id = entry.symptom_id,
                            "Divergent remedy descriptions, keeping first seen"
                        );
                    }
                }
                None => {
                    index.insert(entry.abbreviation.as_str(), rows.len());
                    rows.push(AggregatedRemedy {
                        abbreviation: entry.abbreviation.clone(),
                        description: entry.description.clone(),
                        total_occurrence: 1,
                        total_degree: entry.degree,
                    });
                }
            }
        }

        rows.sort_by(|a, b| {
            b.total_occurrence
                .cmp(&a.total_occurrence)
                .then_with(|| b.total_degree.cmp(&a.total_degree))
                .then_with(|| a.abbreviation.cmp(&b.abbreviation))
        });
        rows
    }
}
