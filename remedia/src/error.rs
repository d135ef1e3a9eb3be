use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemediaError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Operation '{operation}' is not allowed while the session is in step '{from}'")]
    InvalidTransition {
        from: &'static str,
        operation: &'static str,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limiting, network failure or a 5xx answer from a remote provider.
    /// Retried by [`crate::retry::with_retry`]; only surfaced after exhaustion.
    #[error("Transient provider error: {0}")]
    TransientProvider(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("Model output violates the classification schema: {0}")]
    SchemaViolation(String),

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RemediaError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RemediaError::TransientProvider(_))
    }
}

pub type Result<T> = std::result::Result<T, RemediaError>;
