use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Feedback store error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Ingredient detection error: {0}")]
    Detection(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<crate::models::InvalidRating> for AppError {
    fn from(err: crate::models::InvalidRating) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) | AppError::Upload(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Detection(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Cache(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while scoring an individual recipe
///
/// These never escape the engine: the offending recipe is skipped and the
/// error is logged.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("Malformed recipe {id}: {reason}")]
    MalformedRecipe { id: u32, reason: String },

    #[error("No lexical index: the recipe corpus is empty")]
    LexicalIndexUnavailable,

    #[error("Lexical index has no vector for corpus position {0}")]
    LexicalVectorMissing(usize),
}
