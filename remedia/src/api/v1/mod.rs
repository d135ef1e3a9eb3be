pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::test_support::test_state;
    use crate::api::routes::create_router;

    const KEY: &str = "test-key";

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn authed(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {KEY}"));
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn create_session(app: &axum::Router) -> String {
        let response = app
            .clone()
            .oneshot(authed("POST", "/api/v1/sessions", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        json["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn protected_route_requires_auth() {
        let app = create_router(test_state(vec![KEY.to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "unauthorized");
    }

    #[tokio::test]
    async fn health_is_public_and_reports_corpus() {
        let app = create_router(test_state(vec!["secret".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json.get("error").is_none());
        assert_eq!(json["data"]["corpus"]["entries"], 1);
        assert_eq!(json["data"]["corpus"]["dimensions"], 2);
        assert_eq!(json["data"]["llm"]["status"], "unavailable");
        assert_eq!(json["data"]["status"], "degraded");
    }

    #[tokio::test]
    async fn openapi_json_is_public_and_valid() {
        let app = create_router(test_state(vec!["secret".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let version = json["openapi"]
            .as_str()
            .expect("openapi field should be a string");
        assert!(version.starts_with('3'), "got: {version}");
        assert!(json["paths"]["/api/v1/sessions/{sessionId}/classify"].is_object());
    }

    #[tokio::test]
    async fn new_session_starts_collecting_symptom_text() {
        let app = create_router(test_state(vec![KEY.to_string()]));
        let id = create_session(&app).await;

        let response = app
            .oneshot(authed("GET", &format!("/api/v1/sessions/{id}"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["step"], "collecting_symptom_text");
        assert_eq!(json["data"]["accumulatedRemedies"], 0);
        assert!(json["data"]["classification"].is_null());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let app = create_router(test_state(vec![KEY.to_string()]));

        let response = app
            .oneshot(authed("GET", "/api/v1/sessions/nope", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn search_before_classification_is_conflict() {
        let app = create_router(test_state(vec![KEY.to_string()]));
        let id = create_session(&app).await;

        let response = app
            .oneshot(authed("POST", &format!("/api/v1/sessions/{id}/search"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "conflict");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("collecting_symptom_text"));
    }

    #[tokio::test]
    async fn classify_without_llm_is_unavailable_and_keeps_step() {
        let app = create_router(test_state(vec![KEY.to_string()]));
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                &format!("/api/v1/sessions/{id}/classify"),
                Some(r#"{"text":"Schlaflosigkeit nach Mitternacht"}"#),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "provider_unavailable");

        let response = app
            .oneshot(authed("GET", &format!("/api/v1/sessions/{id}"), None))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["step"], "collecting_symptom_text");
    }

    #[tokio::test]
    async fn empty_symptom_text_is_invalid_request() {
        let app = create_router(test_state(vec![KEY.to_string()]));
        let id = create_session(&app).await;

        let response = app
            .oneshot(authed(
                "POST",
                &format!("/api/v1/sessions/{id}/classify"),
                Some(r#"{"text":"   "}"#),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_uses_error_envelope() {
        let app = create_router(test_state(vec![KEY.to_string()]));
        let id = create_session(&app).await;

        let response = app
            .oneshot(authed(
                "POST",
                &format!("/api/v1/sessions/{id}/reset"),
                Some(r#"{"scope":"#),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn empty_report_csv_has_header_only() {
        let app = create_router(test_state(vec![KEY.to_string()]));
        let id = create_session(&app).await;

        let response = app
            .oneshot(authed("GET", &format!("/api/v1/sessions/{id}/report.csv"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/csv"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8(bytes.to_vec()).unwrap().trim_end(),
            "abbreviation,description,total_occurrence,total_degree"
        );
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let app = create_router(test_state(vec![KEY.to_string()]));
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(authed("DELETE", &format!("/api/v1/sessions/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(authed("GET", &format!("/api/v1/sessions/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
