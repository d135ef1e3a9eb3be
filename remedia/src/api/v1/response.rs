//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },       // present on success, absent on error
//!   "error": { "code": "conflict", "message": "..." }  // present on error, absent on success
//! }
//! ```
//!
//! The CSV report is the one exception and is served as plain `text/csv`.
//!
//! ## ID Formats
//!
//! - **sessionId**: nanoid, 21 characters (e.g. `"V1StGXR8_Z5jdHi6B-myT"`)
//! - **symptomId**: integer primary key of the reference corpus

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::RemediaError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request was malformed, had invalid parameters, or failed validation.
    /// HTTP 400.
    InvalidRequest,
    /// Authentication is required or the provided credentials are invalid.
    /// HTTP 401.
    Unauthorized,
    /// The session or resource does not exist. HTTP 404.
    NotFound,
    /// The operation is not allowed in the session's current step, or would
    /// count a selection twice. HTTP 409.
    Conflict,
    /// An unexpected server-side error occurred. Internal details are never
    /// leaked to the client. HTTP 500.
    InternalError,
    /// The model answered, but not in the classification schema. HTTP 502.
    UpstreamInvalid,
    /// A provider rejected the request permanently (bad key, bad model). HTTP 502.
    UpstreamError,
    /// A provider kept failing transiently until retries ran out, or no
    /// provider is configured. HTTP 503.
    ProviderUnavailable,
    /// A required local resource (reference database, corpus) is unreachable.
    /// HTTP 503.
    ServiceUnavailable,
}

impl ErrorCode {
    /// Returns the HTTP status code corresponding to this error code.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamInvalid | Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::ProviderUnavailable | Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
            Self::UpstreamInvalid => write!(f, "upstream_invalid"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::ProviderUnavailable => write!(f, "provider_unavailable"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

/// Structured error payload within the API envelope.
///
/// ```json
/// { "code": "not_found", "message": "Session abc not found" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    /// Machine-readable error classification.
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

/// Canonical v1 API response envelope.
///
/// On success, `data` is present and `error` is absent. On error, `error` is
/// present and `data` is absent. The HTTP status code is derived from the
/// error code or set by constructors like [`ApiResponse::created`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Resource created response (HTTP 201).
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::CREATED,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<RemediaError> for ApiResponse<T> {
    /// Convert a [`RemediaError`] into a v1 [`ApiResponse`].
    ///
    /// Provider and storage failures are logged and answered with a generic
    /// message; only client-caused errors echo their message.
    fn from(err: RemediaError) -> Self {
        match err {
            RemediaError::NotFound(msg) => ApiResponse::error(ErrorCode::NotFound, msg),

            RemediaError::Validation(msg) => ApiResponse::error(ErrorCode::InvalidRequest, msg),

            RemediaError::Json(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            ref transition @ RemediaError::InvalidTransition { .. } => {
                ApiResponse::error(ErrorCode::Conflict, transition.to_string())
            }

            RemediaError::Conflict(msg) => ApiResponse::error(ErrorCode::Conflict, msg),

            RemediaError::SchemaViolation(msg) => {
                tracing::warn!(error = %msg, "Model answer rejected");
                ApiResponse::error(
                    ErrorCode::UpstreamInvalid,
                    "The classification model returned an answer outside the expected schema",
                )
            }

            RemediaError::TransientProvider(msg) => {
                tracing::error!(error = %msg, "Provider still failing after retries");
                ApiResponse::error(
                    ErrorCode::ProviderUnavailable,
                    "A remote provider is temporarily unavailable, try again later",
                )
            }

            RemediaError::LlmUnavailable(msg) => {
                ApiResponse::error(ErrorCode::ProviderUnavailable, format!("LLM unavailable: {msg}"))
            }

            ref upstream @ (RemediaError::Llm(_) | RemediaError::Embedding(_)) => {
                tracing::error!(error = %upstream, "Provider rejected request");
                ApiResponse::error(ErrorCode::UpstreamError, "A remote provider rejected the request")
            }

            RemediaError::ResourceUnavailable(msg) => {
                tracing::error!(error = %msg, "Resource unavailable");
                ApiResponse::error(ErrorCode::ServiceUnavailable, "A required resource is unavailable")
            }

            ref internal @ (RemediaError::Database(_)
            | RemediaError::Http(_)
            | RemediaError::Io(_)
            | RemediaError::Csv(_)
            | RemediaError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}

impl IntoResponse for RemediaError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}
