//! GitHub summarizer endpoints.
//!
//! Both routes sit behind `require_api_key`; by the time a handler runs the
//! caller's key has already validated.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        github::{ApiKeyInfo, GithubRepo, SummarizeRequest, SummaryData},
        response::ApiResponse,
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summarize the repository named in the JSON body.
///
/// # Request
///
/// ```text
/// POST /api/github-summarizer
/// x-api-key: key_Ab12Cd34Ef56Gh78
///
/// { "githubUrl": "https://github.com/owner/repository" }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "success": true,
///   "message": "GitHub repository summarized",
///   "data": {
///     "githubUrl": "https://github.com/owner/repository",
///     "summary": "A toolkit for ...",
///     "readmePreview": "# repository ...",
///     "apiKeyInfo": { "name": "production", "monthly_limit": 1000, "current_usage": 0 }
///   }
/// }
/// ```
///
/// # Errors
///
/// - **401**: No key supplied
/// - **400**: Missing or malformed `githubUrl`
/// - **404**: Key not valid
/// - **502**: README fetch or summary generation failed
pub async fn summarize(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SummaryData>>, AppError> {
    let Json(request) = payload?;
    respond(&state, &auth, request.github_url).await
}

/// Summarize the repository given as `?githubUrl=`. Same outcomes as the POST variant.
pub async fn summarize_query(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<SummarizeRequest>, QueryRejection>,
) -> Result<Json<ApiResponse<SummaryData>>, AppError> {
    let Query(request) = query?;
    respond(&state, &auth, request.github_url).await
}

async fn respond(
    state: &AppState,
    auth: &AuthContext,
    github_url: Option<String>,
) -> Result<Json<ApiResponse<SummaryData>>, AppError> {
    let github_url = github_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("GitHub URL is required".to_string()))?;
    let repo = GithubRepo::parse(&github_url)?;

    tracing::info!(
        owner = %repo.owner,
        repo = %repo.repo,
        key_name = %auth.key.name,
        "Summarizing repository"
    );

    let summary = state.summarizer.summarize(&repo).await?;

    Ok(Json(ApiResponse::ok(
        "GitHub repository summarized",
        SummaryData {
            github_url,
            summary: summary.summary,
            readme_preview: summary.readme_preview,
            api_key_info: ApiKeyInfo::from(&auth.key),
        },
    )))
}

/// Response of the summarizer status endpoint.
#[derive(Debug, Serialize)]
pub struct SummarizerStatus {
    /// Whether generated summaries are enabled
    pub llm_configured: bool,
    pub llm_key_length: usize,
    /// First few characters of the configured credential, then a mask
    pub llm_key_preview: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Report whether an LLM credential is configured, without revealing it.
///
/// `GET /api/summarizer/status`
pub async fn status(State(state): State<AppState>) -> Json<SummarizerStatus> {
    let credential = state.llm_credential.as_ref();

    Json(SummarizerStatus {
        llm_configured: credential.is_some(),
        llm_key_length: credential.map_or(0, |c| c.length),
        llm_key_preview: credential.map(|c| c.preview.clone()),
        timestamp: Utc::now(),
    })
}
