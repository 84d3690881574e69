//! API key management HTTP handlers.
//!
//! This module implements the key management endpoints:
//! - GET /api/keys - List keys, newest first
//! - POST /api/keys - Issue a new key
//! - PATCH /api/keys/{id} - Rename a key
//! - DELETE /api/keys/{id} - Revoke (delete) a key

use crate::{
    error::AppError,
    masking::RevealSet,
    models::api_key::{ApiKeyResponse, CreateApiKeyRequest, RenameApiKeyRequest},
    services::api_key_service,
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters of the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListKeysQuery {
    /// Comma-separated ids whose secrets are shown unmasked
    #[serde(default)]
    pub reveal: Option<String>,
}

/// List all keys.
///
/// # Endpoint
///
/// `GET /api/keys?reveal=<id>,<id>`
///
/// # Response
///
/// - **Success (200 OK)**: Array of keys, newest first (may be empty).
///   Secrets are masked except for the ids listed in `reveal`.
/// - **Error (400)**: `reveal` contains something that is not a UUID
/// - **Error (500)**: Key store error
///
/// ```json
/// [
///   {
///     "id": "550e8400-e29b-41d4-a716-446655440000",
///     "name": "production",
///     "key": "key_Ab12Cd34Ef*****",
///     "masked": true,
///     "monthly_limit": 1000,
///     "current_usage": 0,
///     "created_at": "2025-12-20T10:00:00Z"
///   }
/// ]
/// ```
pub async fn list_keys(
    State(state): State<AppState>,
    query: Result<Query<ListKeysQuery>, QueryRejection>,
) -> Result<Json<Vec<ApiKeyResponse>>, AppError> {
    let Query(query) = query?;
    let reveal = match query.reveal.as_deref() {
        Some(ids) => RevealSet::parse(ids)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid reveal id: {}", e)))?,
        None => RevealSet::new(),
    };

    let keys = api_key_service::list_keys(state.store.as_ref()).await?;

    let responses = keys
        .into_iter()
        .map(|key| ApiKeyResponse::with_reveal(key, &reveal))
        .collect();

    Ok(Json(responses))
}

/// Issue a new key.
///
/// # Endpoint
///
/// `POST /api/keys`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "production",
///   "monthly_limit": 1000
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The new key with its secret unmasked
/// - **Error (400)**: Blank name or negative limit
/// - **Error (409)**: Name already in use (ignoring case)
/// - **Error (500)**: Key store error
pub async fn create_key(
    State(state): State<AppState>,
    payload: Result<Json<CreateApiKeyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let key =
        api_key_service::create_key(state.store.as_ref(), &request.name, request.monthly_limit)
            .await?;

    Ok((StatusCode::CREATED, Json(ApiKeyResponse::revealed(key))))
}

/// Rename a key.
///
/// # Endpoint
///
/// `PATCH /api/keys/{id}`
///
/// # Request Body
///
/// ```json
/// { "name": "production-eu" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: The renamed key (secret masked)
/// - **Error (400)**: Blank name, or an id that is not a UUID
/// - **Error (404)**: No key with this id
/// - **Error (409)**: Name already in use by another key
pub async fn rename_key(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RenameApiKeyRequest>, JsonRejection>,
) -> Result<Json<ApiKeyResponse>, AppError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let key = api_key_service::rename_key(state.store.as_ref(), id, &request.name).await?;

    Ok(Json(ApiKeyResponse::with_reveal(key, &RevealSet::new())))
}

/// Delete a key permanently.
///
/// # Response
///
/// Returns 204 No Content on success, 404 if the key does not exist
/// (including when it was already deleted), 400 if the id is not a UUID.
pub async fn delete_key(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    api_key_service::delete_key(state.store.as_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT)
}
