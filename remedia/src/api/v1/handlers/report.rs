//! v1 Report handlers.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::v1::dto::ReportResponse;
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

/// `GET /api/v1/sessions/{sessionId}/report`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}/report",
    tag = "report",
    operation_id = "report.get",
    params(("sessionId" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Aggregated remedies", body = ReportResponse),
        (status = 404, description = "Session not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<ReportResponse> {
    match state.triage.report(&id).await {
        Ok(rows) => ApiResponse::success(ReportResponse::from(rows)),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/sessions/{sessionId}/report.csv`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}/report.csv",
    tag = "report",
    operation_id = "report.csv",
    params(("sessionId" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Aggregated remedies as a delimited table", body = String, content_type = "text/csv"),
        (status = 404, description = "Session not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_report_csv(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.triage.report_csv(&id).await {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"remedies.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
