//! v1 Remedy handlers for selected symptoms.

use axum::extract::{Path, State};

use crate::api::v1::dto::SymptomRemediesResponse;
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::services::{AddedRemedies, RemovedRemedies};

/// `GET /api/v1/sessions/{sessionId}/symptoms/{symptomId}/remedies`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}/symptoms/{symptomId}/remedies",
    tag = "remedies",
    operation_id = "remedies.lookup",
    params(
        ("sessionId" = String, Path, description = "Session ID"),
        ("symptomId" = i64, Path, description = "Corpus symptom ID"),
    ),
    responses(
        (status = 200, description = "Remedies of the symptom", body = SymptomRemediesResponse),
        (status = 409, description = "Symptom not selected", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn lookup_remedies(
    State(state): State<AppState>,
    Path((id, symptom_id)): Path<(String, i64)>,
) -> ApiResponse<SymptomRemediesResponse> {
    match state.triage.lookup_remedies(&id, symptom_id).await {
        Ok(remedies) => ApiResponse::success(SymptomRemediesResponse {
            symptom_id,
            remedies,
        }),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/symptoms/{symptomId}/remedies`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/symptoms/{symptomId}/remedies",
    tag = "remedies",
    operation_id = "remedies.add",
    params(
        ("sessionId" = String, Path, description = "Session ID"),
        ("symptomId" = i64, Path, description = "Corpus symptom ID"),
    ),
    responses(
        (status = 201, description = "Remedies added to the accumulator", body = AddedRemedies),
        (status = 409, description = "Symptom not selected or already added", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_remedies(
    State(state): State<AppState>,
    Path((id, symptom_id)): Path<(String, i64)>,
) -> ApiResponse<AddedRemedies> {
    match state.triage.add_remedies(&id, symptom_id).await {
        Ok(added) => ApiResponse::created(added),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/sessions/{sessionId}/symptoms/{symptomId}/remedies`
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{sessionId}/symptoms/{symptomId}/remedies",
    tag = "remedies",
    operation_id = "remedies.remove",
    params(
        ("sessionId" = String, Path, description = "Session ID"),
        ("symptomId" = i64, Path, description = "Corpus symptom ID"),
    ),
    responses(
        (status = 200, description = "Remedies of the symptom removed", body = RemovedRemedies),
        (status = 409, description = "Not allowed in the current step", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_remedies(
    State(state): State<AppState>,
    Path((id, symptom_id)): Path<(String, i64)>,
) -> ApiResponse<RemovedRemedies> {
    match state.triage.remove_remedies(&id, symptom_id).await {
        Ok(removed) => ApiResponse::success(removed),
        Err(e) => e.into(),
    }
}
