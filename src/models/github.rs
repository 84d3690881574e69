//! GitHub repository references and summarizer request/response types.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::api_key::ValidatedKey;

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([^/\s?#]+)/([^/\s?#]+)")
        .expect("GitHub URL pattern is valid")
});

/// Owner and repository parsed from a `https://github.com/<owner>/<repo>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepo {
    pub owner: String,
    pub repo: String,
}

impl GithubRepo {
    /// Parse a repository URL. Anything after `<owner>/<repo>` is ignored.
    pub fn parse(url: &str) -> Result<Self, AppError> {
        let captures = GITHUB_URL
            .captures(url.trim())
            .ok_or(AppError::InvalidGithubUrl)?;

        let owner = captures[1].to_string();
        let repo = captures[2].trim_end_matches(".git").to_string();
        if repo.is_empty() {
            return Err(AppError::InvalidGithubUrl);
        }

        Ok(Self { owner, repo })
    }
}

/// Request body for `POST /api/github-summarizer`.
///
/// The key may also travel in the body; the auth middleware reads it from there.
///
/// ```json
/// {
///   "githubUrl": "https://github.com/rust-lang/rust",
///   "key": "key_Ab12Cd34Ef56Gh78"
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default, rename = "githubUrl", alias = "github_url")]
    pub github_url: Option<String>,

    #[serde(default)]
    pub key: Option<String>,
}

/// Output of the summarization collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSummary {
    /// Generated summary, `None` when no LLM is configured
    pub summary: Option<String>,

    /// The first words of the README
    pub readme_preview: String,
}

/// Subset of the validated key echoed back by the summarizer endpoint.
#[derive(Debug, Serialize)]
pub struct ApiKeyInfo {
    pub name: String,
    pub monthly_limit: Option<i64>,
    pub current_usage: i64,
}

impl From<&ValidatedKey> for ApiKeyInfo {
    fn from(key: &ValidatedKey) -> Self {
        Self {
            name: key.name.clone(),
            monthly_limit: key.monthly_limit,
            current_usage: key.current_usage,
        }
    }
}

/// Response payload of the summarizer endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub github_url: String,
    pub summary: Option<String>,
    pub readme_preview: String,
    pub api_key_info: ApiKeyInfo,
}
