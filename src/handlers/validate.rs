//! Key validation endpoint.
//!
//! - POST /api/validate-key - key in the JSON body
//! - GET /api/validate-key?key=... - key in the query string

use crate::{
    error::AppError,
    models::{api_key::ValidatedKey, response::ApiResponse},
    services::validation_service,
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;

/// Request body (POST) or query (GET) of the validation endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ValidateKeyRequest {
    #[serde(default)]
    pub key: Option<String>,
}

/// Validate a key sent in the JSON body.
///
/// # Request Body
///
/// ```json
/// { "key": "key_Ab12Cd34Ef56Gh78" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{ "success": true, "message": "API key valid", "data": { ...key metadata } }`
/// - **Error (400)**: Key missing or empty
/// - **Error (404)**: Key not valid
/// - **Error (500)**: Key store error
pub async fn validate_key(
    State(state): State<AppState>,
    payload: Result<Json<ValidateKeyRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ValidatedKey>>, AppError> {
    // A missing or unparsable body means no usable key was sent
    let Json(request) = payload.map_err(|_| AppError::MalformedKey)?;
    respond(&state, request.key).await
}

/// Validate a key sent as `?key=`. Same outcomes as the POST variant.
pub async fn validate_key_query(
    State(state): State<AppState>,
    query: Result<Query<ValidateKeyRequest>, QueryRejection>,
) -> Result<Json<ApiResponse<ValidatedKey>>, AppError> {
    let Query(request) = query.map_err(|_| AppError::MalformedKey)?;
    respond(&state, request.key).await
}

async fn respond(
    state: &AppState,
    key: Option<String>,
) -> Result<Json<ApiResponse<ValidatedKey>>, AppError> {
    let key = key.ok_or(AppError::MalformedKey)?;
    let validated = validation_service::validate(state.store.as_ref(), &key).await?;

    Ok(Json(ApiResponse::ok("API key valid", validated)))
}
