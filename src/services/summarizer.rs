//! Repository summarizer - README preview plus an optional generated summary.
//!
//! This is the collaborator behind `/api/github-summarizer`. It only runs
//! after the caller's key validated and it never touches key records.
//!
//! # Process
//!
//! 1. Fetch `README.md` from the `main` branch, falling back to `master`
//! 2. Keep the first words as a preview
//! 3. If an LLM is configured, ask it for a summary of the README

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::AppError;
use crate::models::github::{GithubRepo, RepoSummary};

/// Branches tried, in order, when looking for the README.
const README_BRANCHES: [&str; 2] = ["main", "master"];

const SUMMARY_PROMPT: &str = "You summarize GitHub repositories. Given the README of a \
repository, reply with a short plain-text summary of what the project does and who it is for.";

/// Produces a summary for a GitHub repository.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, repo: &GithubRepo) -> Result<RepoSummary, AppError>;
}

/// Settings for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    /// Base URL up to and including the version segment, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
}

/// Summarizer that reads README files from a raw-content host.
#[derive(Debug, Clone)]
pub struct GithubReadmeSummarizer {
    client: reqwest::Client,
    raw_base_url: Url,
    preview_words: usize,
    llm: Option<LlmSettings>,
}

impl GithubReadmeSummarizer {
    /// # Errors
    ///
    /// Returns an error if `raw_base_url` is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(
        raw_base_url: &str,
        preview_words: usize,
        timeout: Duration,
        llm: Option<LlmSettings>,
    ) -> anyhow::Result<Self> {
        // A trailing slash makes `join` append instead of replacing the last segment
        let raw_base_url = Url::parse(&format!("{}/", raw_base_url.trim_end_matches('/')))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            raw_base_url,
            preview_words,
            llm,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = config.openai_api_key().map(|api_key| LlmSettings {
            api_key: api_key.to_string(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
        });

        Self::new(
            &config.github_raw_base_url,
            config.readme_preview_words,
            Duration::from_secs(config.summarizer_timeout_secs),
            llm,
        )
    }

    async fn fetch_readme(&self, repo: &GithubRepo) -> Result<String, AppError> {
        for branch in README_BRANCHES {
            let url = self
                .raw_base_url
                .join(&format!("{}/{}/{}/README.md", repo.owner, repo.repo, branch))
                .map_err(|e| AppError::SummarizerUnavailable(format!("Invalid README URL: {}", e)))?;

            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| AppError::SummarizerUnavailable(format!("README request failed: {}", e)))?;

            if response.status().is_success() {
                return response.text().await.map_err(|e| {
                    AppError::SummarizerUnavailable(format!("README body unreadable: {}", e))
                });
            }

            tracing::debug!(
                owner = %repo.owner,
                repo = %repo.repo,
                branch,
                status = %response.status(),
                "README not found on branch"
            );
        }

        Err(AppError::SummarizerUnavailable(
            "README.md not found in main or master branch".to_string(),
        ))
    }

    async fn generate_summary(&self, llm: &LlmSettings, readme: &str) -> Result<String, AppError> {
        let request = ChatCompletionRequest {
            model: &llm.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SUMMARY_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: readme,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", llm.base_url.trim_end_matches('/')))
            .bearer_auth(&llm.api_key)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppError::SummarizerUnavailable(format!("Summary request failed: {}", e)))?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::SummarizerUnavailable(format!("Summary response invalid: {}", e)))?;

        completion
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::SummarizerUnavailable("Summary response was empty".to_string()))
    }
}

#[async_trait]
impl Summarizer for GithubReadmeSummarizer {
    async fn summarize(&self, repo: &GithubRepo) -> Result<RepoSummary, AppError> {
        let readme = self.fetch_readme(repo).await?;
        let readme_preview = preview(&readme, self.preview_words);

        let summary = match &self.llm {
            Some(llm) => Some(self.generate_summary(llm, &readme).await?),
            None => None,
        };

        Ok(RepoSummary {
            summary,
            readme_preview,
        })
    }
}

/// The first `words` whitespace-separated words of `text`, joined by single spaces.
pub fn preview(text: &str, words: usize) -> String {
    text.split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
