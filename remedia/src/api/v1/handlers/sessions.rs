//! v1 Session workflow handlers.

use axum::extract::{Path, Query, State};

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{
    CandidatesResponse, ClassifyRequest, KeywordsRequest, RefineRequest, ResetRequest,
    SearchQuery, SelectionRequest, SelectionResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::ClassificationResult;
use crate::search::normalize_keywords;
use crate::services::{SessionSnapshot, SessionStep};

/// `POST /api/v1/sessions`
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    operation_id = "sessions.create",
    responses(
        (status = 201, description = "Session created", body = SessionSnapshot),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_session(State(state): State<AppState>) -> ApiResponse<SessionSnapshot> {
    match state.triage.create_session().await {
        Ok(snapshot) => ApiResponse::created(snapshot),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/sessions/{sessionId}`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    operation_id = "sessions.get",
    params(("sessionId" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session found", body = SessionSnapshot),
        (status = 404, description = "Session not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<SessionSnapshot> {
    match state.triage.session(&id).await {
        Ok(snapshot) => ApiResponse::success(snapshot),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/sessions/{sessionId}`
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    operation_id = "sessions.delete",
    params(("sessionId" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session deleted"),
        (status = 404, description = "Session not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<serde_json::Value> {
    match state.triage.delete_session(&id) {
        Ok(()) => ApiResponse::success(serde_json::json!({ "id": id, "deleted": true })),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/classify`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/classify",
    tag = "sessions",
    operation_id = "sessions.classify",
    params(("sessionId" = String, Path, description = "Session ID")),
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Symptom classified", body = ClassificationResult),
        (status = 400, description = "Empty symptom text", body = ApiError),
        (status = 409, description = "Not allowed in the current step", body = ApiError),
        (status = 502, description = "Model answer outside the schema", body = ApiError),
        (status = 503, description = "LLM unavailable or retries exhausted", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn classify(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<ClassifyRequest>,
) -> ApiResponse<ClassificationResult> {
    if req.text.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Symptom text cannot be empty");
    }

    match state.triage.classify(&id, &req.text).await {
        Ok(result) => ApiResponse::success(result),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/refine`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/refine",
    tag = "sessions",
    operation_id = "sessions.refine",
    params(("sessionId" = String, Path, description = "Session ID")),
    request_body = RefineRequest,
    responses(
        (status = 200, description = "Symptom re-classified", body = ClassificationResult),
        (status = 409, description = "Not allowed in the current step", body = ApiError),
        (status = 502, description = "Model answer outside the schema", body = ApiError),
        (status = 503, description = "LLM unavailable or retries exhausted", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn refine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<RefineRequest>,
) -> ApiResponse<ClassificationResult> {
    if req.feedback.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Feedback cannot be empty");
    }

    match state.triage.refine(&id, &req.feedback).await {
        Ok(result) => ApiResponse::success(result),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/search`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/search",
    tag = "sessions",
    operation_id = "sessions.search",
    params(("sessionId" = String, Path, description = "Session ID"), SearchQuery),
    responses(
        (status = 200, description = "Ranked candidates", body = CandidatesResponse),
        (status = 400, description = "top_n out of range", body = ApiError),
        (status = 409, description = "Not allowed in the current step", body = ApiError),
        (status = 503, description = "Embedding provider retries exhausted", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn search(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> ApiResponse<CandidatesResponse> {
    match state.triage.search(&id, query.top_n).await {
        Ok(results) => ApiResponse::success(CandidatesResponse::new(results, Vec::new())),
        Err(e) => e.into(),
    }
}

/// `PUT /api/v1/sessions/{sessionId}/keywords`
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{sessionId}/keywords",
    tag = "sessions",
    operation_id = "sessions.keywords",
    params(("sessionId" = String, Path, description = "Session ID")),
    request_body = KeywordsRequest,
    responses(
        (status = 200, description = "Cached candidates filtered by keywords", body = CandidatesResponse),
        (status = 409, description = "Not allowed in the current step", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_keywords(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<KeywordsRequest>,
) -> ApiResponse<CandidatesResponse> {
    match state.triage.set_keywords(&id, &req.keywords).await {
        Ok(results) => ApiResponse::success(CandidatesResponse::new(
            results,
            normalize_keywords(&req.keywords),
        )),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/selection`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/selection",
    tag = "sessions",
    operation_id = "sessions.select",
    params(("sessionId" = String, Path, description = "Session ID")),
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection recorded", body = SelectionResponse),
        (status = 400, description = "Empty selection or unknown ids", body = ApiError),
        (status = 409, description = "Not allowed in the current step", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn select(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<SelectionRequest>,
) -> ApiResponse<SelectionResponse> {
    match state.triage.select(&id, &req.symptom_ids).await {
        Ok(symptom_ids) => ApiResponse::success(SelectionResponse {
            symptom_ids,
            step: SessionStep::SelectingRemedies,
        }),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/finish`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/finish",
    tag = "sessions",
    operation_id = "sessions.finish",
    params(("sessionId" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session moved to final review", body = SessionSnapshot),
        (status = 409, description = "Not allowed in the current step", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn finish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<SessionSnapshot> {
    match state.triage.finish(&id).await {
        Ok(snapshot) => ApiResponse::success(snapshot),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/reset`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/reset",
    tag = "sessions",
    operation_id = "sessions.reset",
    params(("sessionId" = String, Path, description = "Session ID")),
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Session reset", body = SessionSnapshot),
        (status = 404, description = "Session not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<ResetRequest>,
) -> ApiResponse<SessionSnapshot> {
    match state.triage.reset(&id, req.scope).await {
        Ok(snapshot) => ApiResponse::success(snapshot),
        Err(e) => e.into(),
    }
}
