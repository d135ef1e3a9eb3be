use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let sessions = Router::new()
        .route("/", post(handlers::sessions::create_session))
        .route(
            "/{sessionId}",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route("/{sessionId}/classify", post(handlers::sessions::classify))
        .route("/{sessionId}/refine", post(handlers::sessions::refine))
        .route("/{sessionId}/search", post(handlers::sessions::search))
        .route("/{sessionId}/keywords", put(handlers::sessions::set_keywords))
        .route("/{sessionId}/selection", post(handlers::sessions::select))
        .route(
            "/{sessionId}/symptoms/{symptomId}/remedies",
            get(handlers::remedies::lookup_remedies)
                .post(handlers::remedies::add_remedies)
                .delete(handlers::remedies::remove_remedies),
        )
        .route("/{sessionId}/finish", post(handlers::sessions::finish))
        .route("/{sessionId}/report", get(handlers::report::get_report))
        .route("/{sessionId}/report.csv", get(handlers::report::get_report_csv))
        .route("/{sessionId}/reset", post(handlers::sessions::reset));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json));

    let protected_routes = Router::new()
        .nest("/sessions", sessions)
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
