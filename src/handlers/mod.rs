//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Calls a service with the collaborators from `AppState`
//! 3. Returns HTTP response (JSON, status code)

/// Key management endpoints
pub mod api_keys;
/// Liveness and store connectivity
pub mod health;
/// GitHub summarizer endpoints
pub mod summarize;
/// Key validation endpoint
pub mod validate;
