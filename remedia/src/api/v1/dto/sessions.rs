//! Session workflow request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};

use crate::models::RankedSymptom;
use crate::services::{ResetScope, SessionStep};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/sessions/{sessionId}/classify`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    /// Free-text symptom description, usually German.
    pub text: String,
}

/// Request body for `POST /v1/sessions/{sessionId}/refine`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    /// Correction or hint about the previous classification.
    pub feedback: String,
}

/// Query parameters for `POST /v1/sessions/{sessionId}/search`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Number of results to keep, `1..=1000`. Defaults to `SEARCH_TOP_N`.
    pub top_n: Option<usize>,
}

/// Request body for `PUT /v1/sessions/{sessionId}/keywords`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeywordsRequest {
    /// Every keyword must occur in a result's path (case-insensitive).
    /// An empty list clears the filter.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Request body for `POST /v1/sessions/{sessionId}/selection`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    /// Ids taken from the cached search results.
    pub symptom_ids: Vec<i64>,
}

/// Request body for `POST /v1/sessions/{sessionId}/reset`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub scope: ResetScope,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Ranked candidates, either fresh from a search or filtered by keywords.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesResponse {
    pub results: Vec<RankedSymptom>,
    pub total: usize,
    /// Normalized keywords the results were filtered with.
    pub keywords: Vec<String>,
}

impl CandidatesResponse {
    pub fn new(results: Vec<RankedSymptom>, keywords: Vec<String>) -> Self {
        Self {
            total: results.len(),
            results,
            keywords,
        }
    }
}

/// Response for `POST /v1/sessions/{sessionId}/selection`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    /// Selected ids, deduplicated, in request order.
    pub symptom_ids: Vec<i64>,
    pub step: SessionStep,
}
