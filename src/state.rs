//! Shared application state handed to every handler via `State`.

use std::sync::Arc;

use crate::masking::{MASK_CHAR, MASK_WIDTH};
use crate::services::summarizer::Summarizer;
use crate::store::KeyStore;

/// Leading characters of the LLM credential the status endpoint may show.
const CREDENTIAL_PREVIEW_CHARS: usize = 4;

#[derive(Clone)]
pub struct AppState {
    /// Key persistence backend, built once at startup
    pub store: Arc<dyn KeyStore>,

    /// Collaborator behind the summarizer endpoint
    pub summarizer: Arc<dyn Summarizer>,

    /// Redacted rendering of the configured LLM credential, if any
    pub llm_credential: Option<LlmCredential>,
}

/// What the status endpoint may say about the LLM credential.
#[derive(Debug, Clone)]
pub struct LlmCredential {
    pub length: usize,
    pub preview: String,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyStore>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            store,
            summarizer,
            llm_credential: None,
        }
    }

    pub fn with_llm_credential(mut self, api_key: Option<&str>) -> Self {
        self.llm_credential = api_key.map(|key| LlmCredential {
            length: key.chars().count(),
            preview: preview_credential(key),
        });
        self
    }
}

/// A fixed-width prefix of a server credential followed by the mask.
///
/// Unlike [`crate::masking::mask_secret`], the amount shown does not grow
/// with the key. Credentials too short to spare a prefix show only the mask.
fn preview_credential(key: &str) -> String {
    let shown = if key.chars().count() > 2 * CREDENTIAL_PREVIEW_CHARS {
        CREDENTIAL_PREVIEW_CHARS
    } else {
        0
    };
    let mut preview: String = key.chars().take(shown).collect();
    preview.extend(std::iter::repeat_n(MASK_CHAR, MASK_WIDTH));
    preview
}
