//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Underlying cause of a store failure, whatever the backend.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Application-wide error type.
///
/// Every failure of the key store, the validation service and the summarizer
/// is one of these variants. Each variant maps to a specific HTTP status code
/// and error code.
///
/// # Error Categories
///
/// - **Store Errors**: the persistence backend could not be reached or failed
/// - **Input Errors**: empty names, negative limits, malformed keys or URLs
/// - **Conflict Errors**: another key already uses the requested name
/// - **Lookup Errors**: no key with the given id or secret
/// - **Upstream Errors**: README fetch or summary generation failed
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The backing store failed (connection error, query error, pool timeout).
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Key store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Another live key already has this name (compared trimmed and case-insensitively).
    ///
    /// Returns HTTP 409 Conflict.
    #[error("An API key named '{0}' already exists")]
    DuplicateName(String),

    /// No key record has the requested id.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("API key not found")]
    ApiKeyNotFound,

    /// The presented key is empty.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("API key is required and must be a non-empty string")]
    MalformedKey,

    /// The presented key does not match any record.
    ///
    /// Returns HTTP 404 Not Found. This is an expected outcome, not a server fault.
    #[error("API key not valid")]
    KeyNotFound,

    /// A protected endpoint was called without any key.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("API key is required")]
    MissingApiKey,

    /// The `githubUrl` does not look like `https://github.com/<owner>/<repo>`.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid GitHub URL format. Expected: https://github.com/owner/repository")]
    InvalidGithubUrl,

    /// The README could not be fetched or the summary could not be generated.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("Summarizer unavailable: {0}")]
    SummarizerUnavailable(String),
}

impl AppError {
    /// Stable machine-readable code used in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::DuplicateName(_) => "duplicate_name",
            AppError::ApiKeyNotFound => "api_key_not_found",
            AppError::MalformedKey => "malformed_key",
            AppError::KeyNotFound => "key_not_found",
            AppError::MissingApiKey => "missing_api_key",
            AppError::InvalidGithubUrl => "invalid_github_url",
            AppError::SummarizerUnavailable(_) => "summarizer_unavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::MalformedKey | AppError::InvalidGithubUrl => {
                StatusCode::BAD_REQUEST
            }
            AppError::MissingApiKey => StatusCode::UNAUTHORIZED,
            AppError::ApiKeyNotFound | AppError::KeyNotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateName(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SummarizerUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreUnavailable(Box::new(err))
    }
}

/// Malformed or mistyped JSON bodies become `InvalidRequest` so that they get
/// the same error body as every other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "success": false,
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Store failures hide their details from the client; they are logged instead.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::InvalidRequest(ref msg) => msg.clone(),
            AppError::StoreUnavailable(ref err) => {
                tracing::error!(error = %err, "Key store request failed");
                "An internal error occurred".to_string()
            }
            AppError::SummarizerUnavailable(ref reason) => {
                tracing::error!(%reason, "Summarizer request failed");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
