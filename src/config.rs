//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (optional): PostgreSQL connection string. Without it the
///   server keeps keys in memory and loses them on restart.
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `GITHUB_RAW_BASE_URL` (optional): where README files are fetched from
/// - `README_PREVIEW_WORDS` (optional): words kept in the README preview, defaults to 100
/// - `SUMMARIZER_TIMEOUT_SECS` (optional): outbound request timeout, defaults to 10
/// - `OPENAI_API_KEY` (optional): enables generated summaries
/// - `OPENAI_BASE_URL` / `OPENAI_MODEL` (optional): chat completion endpoint and model
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_github_raw_base_url")]
    pub github_raw_base_url: String,

    #[serde(default = "default_readme_preview_words")]
    pub readme_preview_words: usize,

    #[serde(default = "default_summarizer_timeout_secs")]
    pub summarizer_timeout_secs: u64,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_github_raw_base_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_readme_preview_words() -> usize {
    100
}

fn default_summarizer_timeout_secs() -> u64 {
    10
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable value cannot be parsed
    /// into its expected type (e.g. a non-numeric `SERVER_PORT`).
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// The LLM credential, ignoring a blank `OPENAI_API_KEY`.
    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
