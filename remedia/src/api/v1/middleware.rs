//! Bearer key check for the session routes.
//!
//! `/health` and `/openapi.json` are mounted outside this layer.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

/// Token from `Authorization: Bearer <token>`, or the rejection message.
fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Missing authorization header")?
        .to_str()
        .map_err(|_| "Authorization header is not valid ASCII")?;

    value
        .strip_prefix("Bearer ")
        .ok_or("Invalid authorization header format. Expected: Bearer <token>")
}

/// Lets a request through only when it carries one of `REMEDIA_API_KEYS`.
///
/// With no keys configured every session route answers 401, so a deployment
/// that forgot the variable is locked rather than open.
pub async fn v1_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let keys = &state.config.server.api_keys;
    if keys.is_empty() {
        return unauthorized("API keys not configured. Set REMEDIA_API_KEYS to enable access.");
    }

    match bearer_token(request.headers()) {
        Ok(token) if keys.iter().any(|key| key == token) => next.run(request).await,
        Ok(_) => {
            tracing::debug!(path = %request.uri().path(), "Rejected unknown API key");
            unauthorized("Invalid API key")
        }
        Err(message) => unauthorized(message),
    }
}

fn unauthorized(message: &str) -> Response {
    ApiResponse::<()>::error(ErrorCode::Unauthorized, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::v1::test_support::test_state;
    use axum::http::StatusCode;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn build_test_app(api_keys: Vec<String>) -> Router {
        let state = test_state(api_keys);

        async fn protected_handler() -> &'static str {
            "protected"
        }

        async fn health_handler() -> &'static str {
            "healthy"
        }

        let public_routes = Router::new().route("/health", get(health_handler));

        let protected_routes = Router::new()
            .route("/protected", get(protected_handler))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                v1_auth_middleware,
            ));

        Router::new()
            .merge(public_routes)
            .merge(protected_routes)
            .with_state(state)
    }

    /// Parses JSON error envelope from response body.
    async fn parse_error_body(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    fn get_with_auth(uri: &str, auth: Option<&str>) -> Request<Body> {
        let builder = Request::builder().uri(uri);
        let builder = match auth {
            Some(value) => builder.header("Authorization", value),
            None => builder,
        };
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn rejects_when_no_keys_configured() {
        let app = build_test_app(vec![]);

        let response = app
            .oneshot(get_with_auth("/protected", Some("Bearer anything")))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "unauthorized");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("REMEDIA_API_KEYS"));
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn allows_valid_key() {
        let app = build_test_app(vec!["key-a".to_string(), "key-b".to_string()]);

        let response = app
            .oneshot(get_with_auth("/protected", Some("Bearer key-b")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_invalid_key() {
        let app = build_test_app(vec!["key-a".to_string()]);

        let response = app
            .oneshot(get_with_auth("/protected", Some("Bearer wrong-key")))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["message"], "Invalid API key");
    }

    #[tokio::test]
    async fn rejects_non_bearer_scheme() {
        let app = build_test_app(vec!["key-a".to_string()]);

        let response = app
            .oneshot(get_with_auth("/protected", Some("Basic a2V5LWE=")))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Bearer <token>"));
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let app = build_test_app(vec!["key-a".to_string()]);

        let response = app.oneshot(get_with_auth("/protected", None)).await.unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["message"], "Missing authorization header");
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err("Missing authorization header"));

        headers.insert(AUTHORIZATION, "Bearer key-a".parse().unwrap());
        assert_eq!(bearer_token(&headers), Ok("key-a"));

        headers.insert(AUTHORIZATION, "bearer key-a".parse().unwrap());
        assert!(bearer_token(&headers).unwrap_err().contains("Bearer <token>"));
    }

    #[tokio::test]
    async fn public_route_bypasses_auth() {
        let app = build_test_app(vec![]);

        let response = app.oneshot(get_with_auth("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
