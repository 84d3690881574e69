//! API key model and API request/response types.
//!
//! This module defines:
//! - `ApiKey`: Database entity representing an issued key
//! - `NewApiKey`: Values the key service hands to the store on creation
//! - `CreateApiKeyRequest` / `RenameApiKeyRequest`: Request bodies
//! - `ApiKeyResponse`: Response body returned to clients (secret masked unless revealed)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::masking::RevealSet;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID), assigned by the store
/// - `name`: Human-readable label, unique ignoring case and surrounding whitespace
/// - `key`: The secret token presented by callers
/// - `monthly_limit`: Optional usage ceiling (advisory only)
/// - `current_usage`: Usage counter, starts at 0
/// - `created_at`: When the key was created
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ApiKey {
    /// Unique identifier for this API key
    pub id: Uuid,

    /// Name chosen by whoever created the key
    pub name: String,

    /// The secret token, stored as issued
    ///
    /// Validation compares the presented key to this value exactly.
    #[sqlx(rename = "key")]
    pub secret: String,

    /// Monthly usage ceiling; `None` means unlimited
    ///
    /// Stored and reported, never enforced.
    pub monthly_limit: Option<i64>,

    /// Number of recorded uses
    pub current_usage: i64,

    /// Timestamp when this API key was created
    pub created_at: DateTime<Utc>,
}

/// Values for a key that has not been persisted yet.
///
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub secret: String,
    pub monthly_limit: Option<i64>,
}

/// Characters stripped from both ends of a key name.
///
/// Must match the `btrim` set of the `api_keys_name_unique` index so that the
/// in-memory store and Postgres agree on what counts as padding.
pub const NAME_PADDING: [char; 4] = [' ', '\t', '\r', '\n'];

/// A key name without its [`NAME_PADDING`].
pub fn trim_name(name: &str) -> &str {
    name.trim_matches(NAME_PADDING)
}

/// Comparison form of a key name: trimmed and lowercased.
///
/// Two names collide when their normalized forms are equal. Case folding is
/// Unicode lowercasing, which is what `lower()` does on a UTF-8 database with
/// a Unicode-aware collation. Under the `C` collation Postgres folds ASCII only.
pub fn normalize_name(name: &str) -> String {
    trim_name(name).to_lowercase()
}

/// Request body for creating a new API key.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "production",
///   "monthly_limit": 1000
/// }
/// ```
///
/// # Validation
///
/// - `name`: Required, must not be blank
/// - `monthly_limit`: Optional, must not be negative; omitted or `null` means unlimited
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateApiKeyRequest {
    pub name: String,

    #[serde(default)]
    pub monthly_limit: Option<i64>,
}

/// Request body for renaming an API key.
///
/// Only the name can change; the secret, limit and usage are fixed.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameApiKeyRequest {
    pub name: String,
}

/// Response body for key management endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "name": "production",
///   "key": "key_Ab12Cd34Ef*****",
///   "masked": true,
///   "monthly_limit": 1000,
///   "current_usage": 0,
///   "created_at": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub name: String,

    /// The secret as displayed: masked unless this record is revealed
    pub key: String,

    /// Whether `key` is the masked rendering
    pub masked: bool,

    pub monthly_limit: Option<i64>,
    pub current_usage: i64,
    pub created_at: DateTime<Utc>,
}

impl ApiKeyResponse {
    /// Render a record honoring the caller's reveal state.
    pub fn with_reveal(key: ApiKey, reveal: &RevealSet) -> Self {
        let masked = !reveal.is_revealed(key.id);
        Self {
            key: reveal.display(&key),
            masked,
            id: key.id,
            name: key.name,
            monthly_limit: key.monthly_limit,
            current_usage: key.current_usage,
            created_at: key.created_at,
        }
    }

    /// Render a record with its secret in the clear.
    ///
    /// Used for the creation response so the caller can copy the new key.
    pub fn revealed(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key: key.secret,
            masked: false,
            monthly_limit: key.monthly_limit,
            current_usage: key.current_usage,
            created_at: key.created_at,
        }
    }
}

/// Metadata returned when a presented key is valid.
///
/// # JSON Example
///
/// ```json
/// {
///   "key": "key_Ab12Cd34Ef56Gh78",
///   "name": "production",
///   "monthly_limit": 100,
///   "current_usage": 0,
///   "created_at": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedKey {
    pub key: String,
    pub name: String,
    pub monthly_limit: Option<i64>,
    pub current_usage: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ValidatedKey {
    fn from(record: ApiKey) -> Self {
        Self {
            key: record.secret,
            name: record.name,
            monthly_limit: record.monthly_limit,
            current_usage: record.current_usage,
            created_at: record.created_at,
        }
    }
}
