//! Data models representing database entities and API payloads.

/// API key entity and key management payloads
pub mod api_key;
/// GitHub repository references and summarizer payloads
pub mod github;
/// Success envelope
pub mod response;
