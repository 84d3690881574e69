//! Key validation - deciding whether a presented string names a live key.
//!
//! The monthly limit is reported, not enforced: a key whose usage has
//! reached its limit still validates, and nothing here increments usage.

use crate::error::AppError;
use crate::models::api_key::ValidatedKey;
use crate::store::KeyStore;

/// Validate a presented key.
///
/// # Process
///
/// 1. Trim the input; blank input is malformed
/// 2. Look up the record whose secret equals the input exactly
/// 3. Return its metadata
///
/// # Errors
///
/// - `MalformedKey`: input is empty after trimming (400)
/// - `KeyNotFound`: no record matches (404)
/// - `StoreUnavailable`: the backend failed (500)
pub async fn validate(store: &dyn KeyStore, presented: &str) -> Result<ValidatedKey, AppError> {
    let presented = presented.trim();
    if presented.is_empty() {
        return Err(AppError::MalformedKey);
    }

    let key = store
        .find_by_secret(presented)
        .await?
        .ok_or(AppError::KeyNotFound)?;

    tracing::debug!(key_id = %key.id, "API key validated");

    Ok(key.into())
}
