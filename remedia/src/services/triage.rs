use std::sync::Arc;

use serde::Serialize;

use crate::db::RemedyStore;
use crate::error::{RemediaError, Result};
use crate::models::{AggregatedRemedy, ClassificationResult, RankedSymptom, RemedyRecord};
use crate::search::SimilaritySearchEngine;
use crate::services::classifier::Classifier;
use crate::services::report;
use crate::services::session::{Operation, ResetScope, SessionSnapshot};
use crate::services::sessions::SessionRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddedRemedies {
    pub symptom_id: i64,
    pub added: usize,
    pub accumulated_remedies: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemovedRemedies {
    pub symptom_id: i64,
    pub removed: usize,
    pub accumulated_remedies: usize,
}

/// Drives one triage session from symptom text to the final remedy report.
///
/// Every operation locks its session for its whole duration, remote calls
/// included, so a session never sees two operations interleave.
#[derive(Clone)]
pub struct TriageService {
    classifier: Classifier,
    search: SimilaritySearchEngine,
    remedies: Arc<dyn RemedyStore>,
    sessions: SessionRegistry,
    report_delimiter: char,
}

impl TriageService {
    pub fn new(
        classifier: Classifier,
        search: SimilaritySearchEngine,
        remedies: Arc<dyn RemedyStore>,
        sessions: SessionRegistry,
        report_delimiter: char,
    ) -> Self {
        Self {
            classifier,
            search,
            remedies,
            sessions,
            report_delimiter,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn search_engine(&self) -> &SimilaritySearchEngine {
        &self.search
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub async fn create_session(&self) -> Result<SessionSnapshot> {
        let (_, handle) = self.sessions.create(self.classifier.fresh_conversation())?;
        let session = handle.lock().await;
        Ok(session.snapshot())
    }

    pub async fn session(&self, session_id: &str) -> Result<SessionSnapshot> {
        let handle = self.sessions.get(session_id)?;
        let session = handle.lock().await;
        Ok(session.snapshot())
    }

    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        if self.sessions.remove(session_id)? {
            Ok(())
        } else {
            Err(RemediaError::NotFound(format!("Session {session_id} not found")))
        }
    }

    pub async fn classify(&self, session_id: &str, text: &str) -> Result<ClassificationResult> {
        self.run_classification(session_id, text, Operation::Classify)
            .await
    }

    /// Re-classify using free-text feedback on the previous answer.
    pub async fn refine(&self, session_id: &str, feedback: &str) -> Result<ClassificationResult> {
        self.run_classification(session_id, feedback, Operation::Refine)
            .await
    }

    async fn run_classification(
        &self,
        session_id: &str,
        text: &str,
        operation: Operation,
    ) -> Result<ClassificationResult> {
        let handle = self.sessions.get(session_id)?;
        let mut session = handle.lock().await;
        let mut flight = session.begin(operation)?;

        let outcome = self
            .classifier
            .classify(flight.conversation_mut(), text)
            .await
            .map_err(|e| {
                tracing::warn!(session_id, operation = operation.as_str(), error = %e, "Classification failed");
                e
            })?;

        let symptom_text = (operation == Operation::Classify).then(|| text.trim());
        flight.record_classification(symptom_text, outcome.result.clone());
        flight.complete();

        Ok(outcome.result)
    }

    /// Search the corpus with the confirmed classification's search path.
    pub async fn search(&self, session_id: &str, top_n: Option<usize>) -> Result<Vec<RankedSymptom>> {
        let handle = self.sessions.get(session_id)?;
        let mut session = handle.lock().await;
        let mut flight = session.begin(Operation::Search)?;

        let classification = flight.classification().cloned().ok_or_else(|| {
            RemediaError::Internal("Session has no classification to search with".to_string())
        })?;

        let results = self
            .search
            .search(
                &classification.search_path,
                classification.upper_category,
                classification.sub_category,
                top_n,
            )
            .await
            .map_err(|e| {
                tracing::warn!(session_id, error = %e, "Similarity search failed");
                e
            })?;

        if results.is_empty() {
            tracing::info!(session_id, "Search found no matching symptoms");
        }

        flight.record_candidates(results.clone());
        flight.complete();
        Ok(results)
    }

    pub async fn set_keywords(&self, session_id: &str, keywords: &[String]) -> Result<Vec<RankedSymptom>> {
        let handle = self.sessions.get(session_id)?;
        let mut session = handle.lock().await;
        session.set_keywords(keywords)
    }

    pub async fn select(&self, session_id: &str, ids: &[i64]) -> Result<Vec<i64>> {
        let handle = self.sessions.get(session_id)?;
        let mut session = handle.lock().await;
        Ok(session.select(ids)?.to_vec())
    }

    pub async fn lookup_remedies(&self, session_id: &str, symptom_id: i64) -> Result<Vec<RemedyRecord>> {
        let handle = self.sessions.get(session_id)?;
        let session = handle.lock().await;
        session.check_selected(Operation::LookupRemedies, symptom_id)?;

        self.remedies.remedies_for(symptom_id).await
    }

    /// Look up the remedies of a selected symptom and add them to the accumulator.
    pub async fn add_remedies(&self, session_id: &str, symptom_id: i64) -> Result<AddedRemedies> {
        let handle = self.sessions.get(session_id)?;
        let mut session = handle.lock().await;
        session.check_selected(Operation::AddRemedies, symptom_id)?;

        let remedies = self.remedies.remedies_for(symptom_id).await?;
        if remedies.is_empty() {
            tracing::info!(session_id, symptom_id, "Symptom has no remedies");
        }

        let added = session.add_remedies(symptom_id, remedies)?;
        Ok(AddedRemedies {
            symptom_id,
            added,
            accumulated_remedies: session.accumulator().len(),
        })
    }

    pub async fn remove_remedies(&self, session_id: &str, symptom_id: i64) -> Result<RemovedRemedies> {
        let handle = self.sessions.get(session_id)?;
        let mut session = handle.lock().await;
        let removed = session.remove_remedies(symptom_id)?;

        Ok(RemovedRemedies {
            symptom_id,
            removed,
            accumulated_remedies: session.accumulator().len(),
        })
    }

    pub async fn finish(&self, session_id: &str) -> Result<SessionSnapshot> {
        let handle = self.sessions.get(session_id)?;
        let mut session = handle.lock().await;
        session.finish()?;
        Ok(session.snapshot())
    }

    pub async fn report(&self, session_id: &str) -> Result<Vec<AggregatedRemedy>> {
        let handle = self.sessions.get(session_id)?;
        let session = handle.lock().await;
        Ok(session.accumulator().aggregate())
    }

    pub async fn report_csv(&self, session_id: &str) -> Result<String> {
        let rows = self.report(session_id).await?;
        report::to_csv(&rows, self.report_delimiter)
    }

    pub async fn reset(&self, session_id: &str, scope: ResetScope) -> Result<SessionSnapshot> {
        let handle = self.sessions.get(session_id)?;
        let mut session = handle.lock().await;

        match scope {
            ResetScope::Partial => session.reset_partial(),
            ResetScope::Full => session.reset_full(self.classifier.fresh_conversation()),
        }

        tracing::info!(session_id, scope = ?scope, "Session reset");
        Ok(session.snapshot())
    }
}
