//! Success envelope shared by the validation and summarizer endpoints.

use serde::Serialize;

/// ```json
/// {
///   "success": true,
///   "message": "API key valid",
///   "data": { ... }
/// }
/// ```
///
/// Failures use the error body produced by `AppError` instead.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}
