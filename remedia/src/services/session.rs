//! Per-session triage state and its step machine.

use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RemediaError, Result};
use crate::models::{ClassificationResult, ConversationState, RankedSymptom, RemedyRecord};
use crate::search::{filter_by_keywords, normalize_keywords};
use crate::services::accumulator::ResultAccumulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    CollectingSymptomText,
    /// Held only while the classification call runs.
    Classifying,
    ReviewingClassification,
    /// Held only while the similarity search runs.
    Searching,
    ReviewingCandidates,
    SelectingRemedies,
    FinalReview,
}

impl SessionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectingSymptomText => "collecting_symptom_text",
            Self::Classifying => "classifying",
            Self::ReviewingClassification => "reviewing_classification",
            Self::Searching => "searching",
            Self::ReviewingCandidates => "reviewing_candidates",
            Self::SelectingRemedies => "selecting_remedies",
            Self::FinalReview => "final_review",
        }
    }
}

impl std::fmt::Display for SessionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Classify,
    Refine,
    Search,
    SetKeywords,
    Select,
    LookupRemedies,
    AddRemedies,
    RemoveRemedies,
    Finish,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::Refine => "refine",
            Self::Search => "search",
            Self::SetKeywords => "set_keywords",
            Self::Select => "select",
            Self::LookupRemedies => "lookup_remedies",
            Self::AddRemedies => "add_remedies",
            Self::RemoveRemedies => "remove_remedies",
            Self::Finish => "finish",
        }
    }

    /// Step reached on success, or `None` if the operation is not allowed from `from`.
    pub fn transition(self, from: SessionStep) -> Option<SessionStep> {
        use SessionStep::*;

        match (self, from) {
            (Self::Classify, CollectingSymptomText) => Some(ReviewingClassification),
            (Self::Refine, ReviewingClassification) => Some(ReviewingClassification),
            (Self::Search, ReviewingClassification) => Some(ReviewingCandidates),
            (Self::SetKeywords, ReviewingCandidates) => Some(ReviewingCandidates),
            (Self::Select, ReviewingCandidates) => Some(SelectingRemedies),
            (Self::LookupRemedies | Self::AddRemedies | Self::RemoveRemedies, SelectingRemedies) => {
                Some(SelectingRemedies)
            }
            (Self::Finish, SelectingRemedies) => Some(FinalReview),
            _ => None,
        }
    }

    /// Step shown while the operation waits on a remote provider.
    pub fn in_flight_step(self) -> Option<SessionStep> {
        match self {
            Self::Classify | Self::Refine => Some(SessionStep::Classifying),
            Self::Search => Some(SessionStep::Searching),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResetScope {
    /// Start a new symptom, keeping the conversation and collected remedies.
    Partial,
    /// Discard everything and re-seed the conversation.
    Full,
}

/// Read-only view of a session for API responses.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub step: SessionStep,
    pub symptom_text: Option<String>,
    pub classification: Option<ClassificationResult>,
    pub search_performed: bool,
    pub candidate_count: usize,
    pub keywords: Vec<String>,
    pub selection: Vec<i64>,
    pub added_symptoms: Vec<i64>,
    pub accumulated_remedies: usize,
    pub conversation_turns: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    step: SessionStep,
    conversation: ConversationState,
    symptom_text: Option<String>,
    classification: Option<ClassificationResult>,
    candidates: Vec<RankedSymptom>,
    search_performed: bool,
    keywords: Vec<String>,
    selection: Vec<i64>,
    added: BTreeSet<i64>,
    accumulator: ResultAccumulator,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, conversation: ConversationState) -> Self {
        let now = Utc::now();
        Self {
            id,
            step: SessionStep::CollectingSymptomText,
            conversation,
            symptom_text: None,
            classification: None,
            candidates: Vec::new(),
            search_performed: false,
            keywords: Vec::new(),
            selection: Vec::new(),
            added: BTreeSet::new(),
            accumulator: ResultAccumulator::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn step(&self) -> SessionStep {
        self.step
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut ConversationState {
        &mut self.conversation
    }

    pub fn symptom_text(&self) -> Option<&str> {
        self.symptom_text.as_deref()
    }

    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.classification.as_ref()
    }

    pub fn candidates(&self) -> &[RankedSymptom] {
        &self.candidates
    }

    pub fn search_performed(&self) -> bool {
        self.search_performed
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn selection(&self) -> &[i64] {
        &self.selection
    }

    /// Symptom ids whose remedies are currently in the accumulator.
    pub fn added_symptoms(&self) -> impl Iterator<Item = i64> + '_ {
        self.added.iter().copied()
    }

    pub fn accumulator(&self) -> &ResultAccumulator {
        &self.accumulator
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            step: self.step,
            symptom_text: self.symptom_text.clone(),
            classification: self.classification.clone(),
            search_performed: self.search_performed,
            candidate_count: self.candidates.len(),
            keywords: self.keywords.clone(),
            selection: self.selection.clone(),
            added_symptoms: self.added.iter().copied().collect(),
            accumulated_remedies: self.accumulator.len(),
            conversation_turns: self.conversation.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Target step of `operation`, or `InvalidTransition` from the current step.
    pub fn check(&self, operation: Operation) -> Result<SessionStep> {
        operation
            .transition(self.step)
            .ok_or(RemediaError::InvalidTransition {
                from: self.step.as_str(),
                operation: operation.as_str(),
            })
    }

    /// Enter the in-flight step of a remote operation.
    ///
    /// The returned guard puts the previous step back when dropped without
    /// [`InFlight::complete`], which covers both errors and cancelled requests.
    pub fn begin(&mut self, operation: Operation) -> Result<InFlight<'_>> {
        let target = self.check(operation)?;
        let previous = self.step;

        if let Some(step) = operation.in_flight_step() {
            self.step = step;
        }

        tracing::debug!(
            session_id = %self.id,
            operation = operation.as_str(),
            from = previous.as_str(),
            "Operation started"
        );

        Ok(InFlight {
            session: self,
            previous,
            target,
            completed: false,
        })
    }

    fn move_to(&mut self, step: SessionStep) {
        if self.step != step {
            tracing::info!(
                session_id = %self.id,
                from = self.step.as_str(),
                to = step.as_str(),
                "Session step changed"
            );
        }
        self.step = step;
        self.updated_at = Utc::now();
    }

    /// Record a successful classification. The conversation has already been advanced.
    pub fn record_classification(
        &mut self,
        symptom_text: Option<&str>,
        classification: ClassificationResult,
    ) {
        if let Some(text) = symptom_text {
            self.symptom_text = Some(text.to_string());
        }
        self.classification = Some(classification);
    }

    pub fn record_candidates(&mut self, candidates: Vec<RankedSymptom>) {
        self.candidates = candidates;
        self.search_performed = true;
        self.keywords.clear();
    }

    /// Replace the keyword filter and return the filtered candidate view.
    pub fn set_keywords(&mut self, keywords: &[String]) -> Result<Vec<RankedSymptom>> {
        let target = self.check(Operation::SetKeywords)?;
        self.keywords = normalize_keywords(keywords);
        self.move_to(target);
        Ok(self.filtered_candidates())
    }

    /// Cached candidates with the keyword filter applied.
    pub fn filtered_candidates(&self) -> Vec<RankedSymptom> {
        filter_by_keywords(&self.candidates, &self.keywords)
    }

    pub fn select(&mut self, ids: &[i64]) -> Result<&[i64]> {
        let target = self.check(Operation::Select)?;

        if ids.is_empty() {
            return Err(RemediaError::Validation(
                "Select at least one symptom".to_string(),
            ));
        }

        if let Some(unknown) = ids
            .iter()
            .find(|id| !self.candidates.iter().any(|c| c.id == **id))
        {
            return Err(RemediaError::Validation(format!(
                "Symptom {unknown} is not among the search results"
            )));
        }

        let mut selection = Vec::with_capacity(ids.len());
        for id in ids {
            if !selection.contains(id) {
                selection.push(*id);
            }
        }

        self.selection = selection;
        self.move_to(target);
        Ok(&self.selection)
    }

    /// Ensure `symptom_id` may have its remedies looked up right now.
    pub fn check_selected(&self, operation: Operation, symptom_id: i64) -> Result<()> {
        self.check(operation)?;

        if !self.selection.contains(&symptom_id) {
            return Err(RemediaError::Conflict(format!(
                "Symptom {symptom_id} is not part of the current selection"
            )));
        }

        Ok(())
    }

    /// Add looked-up remedies for a selected symptom. Each selection counts once.
    pub fn add_remedies(&mut self, symptom_id: i64, remedies: Vec<RemedyRecord>) -> Result<usize> {
        self.check_selected(Operation::AddRemedies, symptom_id)?;

        if self.added.contains(&symptom_id) {
            return Err(RemediaError::Conflict(format!(
                "Remedies of symptom {symptom_id} were already added"
            )));
        }

        let added = self.accumulator.add(remedies, symptom_id);
        self.added.insert(symptom_id);
        self.updated_at = Utc::now();

        tracing::debug!(session_id = %self.id, symptom_id, added, "Remedies added");
        Ok(added)
    }

    pub fn remove_remedies(&mut self, symptom_id: i64) -> Result<usize> {
        self.check(Operation::RemoveRemedies)?;

        let removed = self.accumulator.remove(symptom_id);
        self.added.remove(&symptom_id);
        self.updated_at = Utc::now();

        tracing::debug!(session_id = %self.id, symptom_id, removed, "Remedies removed");
        Ok(removed)
    }

    pub fn finish(&mut self) -> Result<()> {
        let target = self.check(Operation::Finish)?;
        self.move_to(target);
        Ok(())
    }

    /// Back to a new symptom, keeping conversation and accumulator.
    pub fn reset_partial(&mut self) {
        self.symptom_text = None;
        self.classification = None;
        self.candidates.clear();
        self.search_performed = false;
        self.keywords.clear();
        self.selection.clear();
        self.move_to(SessionStep::CollectingSymptomText);
    }

    /// Discard all state and start over from `conversation`.
    pub fn reset_full(&mut self, conversation: ConversationState) {
        self.reset_partial();
        self.conversation = conversation;
        self.accumulator.clear();
        self.added.clear();
    }
}

/// Guard for a session waiting on a remote call. See [`Session::begin`].
pub struct InFlight<'a> {
    session: &'a mut Session,
    previous: SessionStep,
    target: SessionStep,
    completed: bool,
}

impl InFlight<'_> {
    pub fn complete(mut self) {
        self.completed = true;
        let target = self.target;
        self.session.move_to(target);
    }
}

impl Deref for InFlight<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for InFlight<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::debug!(
                session_id = %self.session.id,
                restored = self.previous.as_str(),
                "Operation did not complete, restoring step"
            );
            self.session.step = self.previous;
        }
    }
}
