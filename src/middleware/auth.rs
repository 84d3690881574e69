//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Find the presented API key (header, query string or JSON body)
//! 2. Validate it against the key store
//! 3. Inject the validated key into the request
//! 4. Reject the request when no key is present or it does not validate

use axum::{
    body::{Body, to_bytes},
    extract::{Query, Request, State},
    http::{Method, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::{
    error::AppError, models::api_key::ValidatedKey, services::validation_service, state::AppState,
};

/// Header carrying the key on protected endpoints.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Upper bound on a body buffered while looking for the key.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Authentication context attached to authenticated requests.
///
/// Handlers extract this with `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Metadata of the key that authenticated the request
    pub key: ValidatedKey,
}

#[derive(Debug, Default, Deserialize)]
struct KeyQuery {
    key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyBody {
    key: Option<String>,
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Look for the key in `x-api-key`, then `Authorization: Bearer <key>`,
///    then the `key` query parameter, then a `key` field in a JSON body
/// 2. No (non-blank) key anywhere: 401 Unauthorized
/// 3. Validate the key: 404 when unknown, 500 when the store is down
/// 4. Inject `AuthContext` and call the next handler
///
/// The body, when read, is put back unchanged for the handler.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (presented, mut request) = extract_presented_key(request).await?;
    let presented = presented.ok_or(AppError::MissingApiKey)?;

    let key = validation_service::validate(state.store.as_ref(), &presented).await?;

    request.extensions_mut().insert(AuthContext { key });

    Ok(next.run(request).await)
}

async fn extract_presented_key(request: Request) -> Result<(Option<String>, Request), AppError> {
    let headers = request.headers();

    let from_headers = headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(non_blank)
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .and_then(non_blank)
        });
    if from_headers.is_some() {
        return Ok((from_headers, request));
    }

    let from_query = Query::<KeyQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.key)
        .as_deref()
        .and_then(non_blank);
    if from_query.is_some() {
        return Ok((from_query, request));
    }

    if request.method() != Method::POST {
        return Ok((None, request));
    }

    // Buffer the body to look for a `key` field, then rebuild the request
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Unreadable request body: {}", e)))?;

    let from_body = serde_json::from_slice::<KeyBody>(&bytes)
        .ok()
        .and_then(|body| body.key)
        .as_deref()
        .and_then(non_blank);

    Ok((from_body, Request::from_parts(parts, Body::from(bytes))))
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
