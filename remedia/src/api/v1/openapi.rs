use axum::Json;
use utoipa::OpenApi;

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Remedia API",
        version = "1.0.0",
        description = "Symptom triage: classify a symptom, search the repertory corpus, collect and aggregate remedies.",
    ),
    paths(
        handlers::health::health_check,
        handlers::sessions::create_session,
        handlers::sessions::get_session,
        handlers::sessions::delete_session,
        handlers::sessions::classify,
        handlers::sessions::refine,
        handlers::sessions::search,
        handlers::sessions::set_keywords,
        handlers::sessions::select,
        handlers::sessions::finish,
        handlers::sessions::reset,
        handlers::remedies::lookup_remedies,
        handlers::remedies::add_remedies,
        handlers::remedies::remove_remedies,
        handlers::report::get_report,
        handlers::report::get_report_csv,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Domain
        crate::taxonomy::UpperCategory,
        crate::taxonomy::SubCategory,
        crate::models::ClassificationResult,
        crate::models::RankedSymptom,
        crate::models::RemedyRecord,
        crate::models::AggregatedRemedy,
        crate::services::SessionStep,
        crate::services::ResetScope,
        crate::services::SessionSnapshot,
        crate::services::AddedRemedies,
        crate::services::RemovedRemedies,
        // Sessions
        dto::ClassifyRequest,
        dto::RefineRequest,
        dto::KeywordsRequest,
        dto::SelectionRequest,
        dto::ResetRequest,
        dto::CandidatesResponse,
        dto::SelectionResponse,
        // Remedies
        dto::SymptomRemediesResponse,
        dto::ReportResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::CorpusStatus,
        handlers::health::EmbeddingsStatus,
        handlers::health::LlmStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "sessions", description = "Triage session workflow"),
        (name = "remedies", description = "Remedy lookup and accumulation for selected symptoms"),
        (name = "report", description = "Aggregated remedy report"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
