//! Remedy lookup and report DTOs for the v1 API.

use serde::Serialize;

use crate::models::{AggregatedRemedy, RemedyRecord};

/// Response for `GET /v1/sessions/{sessionId}/symptoms/{symptomId}/remedies`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRemediesResponse {
    pub symptom_id: i64,
    /// Sorted by degree descending, then abbreviation.
    pub remedies: Vec<RemedyRecord>,
}

/// Response for `GET /v1/sessions/{sessionId}/report`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// One row per remedy, most frequent first.
    pub remedies: Vec<AggregatedRemedy>,
    pub total: usize,
}

impl From<Vec<AggregatedRemedy>> for ReportResponse {
    fn from(remedies: Vec<AggregatedRemedy>) -> Self {
        Self {
            total: remedies.len(),
            remedies,
        }
    }
}
