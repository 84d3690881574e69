//! API key service - issuing, listing, renaming and revoking keys.
//!
//! This service handles:
//! - Name validation (non-blank, unique ignoring case and padding)
//! - Secret generation
//! - Existence checks ahead of rename and delete
//!
//! # Duplicate Names
//!
//! The duplicate scan here and the write that follows are separate store
//! calls. The store enforces uniqueness itself and reports a lost race as
//! `DuplicateName`, so callers see the same error either way.

use rand::{Rng, distr::Alphanumeric};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::api_key::{ApiKey, NewApiKey, normalize_name, trim_name};
use crate::store::KeyStore;

/// Prefix that marks a token as one of our API keys.
pub const SECRET_PREFIX: &str = "key_";

/// Random characters after the prefix.
const SECRET_RANDOM_LEN: usize = 16;

/// List every key, newest first.
pub async fn list_keys(store: &dyn KeyStore) -> Result<Vec<ApiKey>, AppError> {
    store.list().await
}

/// Issue a new key.
///
/// # Process
///
/// 1. Trim and validate the name and limit
/// 2. Reject names already in use
/// 3. Generate the secret
/// 4. Persist with `current_usage = 0`
///
/// # Errors
///
/// - `InvalidRequest`: blank name or negative limit
/// - `DuplicateName`: another key already uses this name
/// - `StoreUnavailable`: the backend failed
pub async fn create_key(
    store: &dyn KeyStore,
    name: &str,
    monthly_limit: Option<i64>,
) -> Result<ApiKey, AppError> {
    let name = validate_name(name)?;

    if let Some(limit) = monthly_limit {
        if limit < 0 {
            return Err(AppError::InvalidRequest(
                "Monthly limit cannot be negative".to_string(),
            ));
        }
    }

    ensure_name_available(store, &name, None).await?;

    let key = store
        .insert(NewApiKey {
            name,
            secret: generate_secret(),
            monthly_limit,
        })
        .await?;

    tracing::info!(key_id = %key.id, name = %key.name, "API key created");

    Ok(key)
}

/// Change the name of an existing key.
///
/// The secret, limit and usage are untouched. Renaming a key to its own
/// name (in any case) is allowed.
///
/// # Errors
///
/// - `InvalidRequest`: blank name
/// - `ApiKeyNotFound`: no key with this id
/// - `DuplicateName`: another key already uses this name
/// - `StoreUnavailable`: the backend failed
pub async fn rename_key(store: &dyn KeyStore, id: Uuid, name: &str) -> Result<ApiKey, AppError> {
    let name = validate_name(name)?;

    let keys = store.list().await?;
    if !keys.iter().any(|key| key.id == id) {
        return Err(AppError::ApiKeyNotFound);
    }
    check_duplicate(&keys, &name, Some(id))?;

    // The record may have been deleted since the scan
    let key = store
        .update_name(id, &name)
        .await?
        .ok_or(AppError::ApiKeyNotFound)?;

    tracing::info!(key_id = %key.id, name = %key.name, "API key renamed");

    Ok(key)
}

/// Permanently remove a key.
///
/// Deleting an id that does not exist (including one deleted earlier) fails
/// with `ApiKeyNotFound`.
pub async fn delete_key(store: &dyn KeyStore, id: Uuid) -> Result<(), AppError> {
    if !store.delete(id).await? {
        return Err(AppError::ApiKeyNotFound);
    }

    tracing::info!(key_id = %id, "API key deleted");

    Ok(())
}

/// Generate a new secret: [`SECRET_PREFIX`] followed by random alphanumerics.
///
/// Collisions are not checked here; the store's unique constraint on the
/// secret column rejects one if it ever happens.
pub fn generate_secret() -> String {
    let random: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{SECRET_PREFIX}{random}")
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = trim_name(name);
    if name.is_empty() {
        return Err(AppError::InvalidRequest("Name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

async fn ensure_name_available(
    store: &dyn KeyStore,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let keys = store.list().await?;
    check_duplicate(&keys, name, except)
}

fn check_duplicate(keys: &[ApiKey], name: &str, except: Option<Uuid>) -> Result<(), AppError> {
    let wanted = normalize_name(name);
    let taken = keys
        .iter()
        .filter(|key| Some(key.id) != except)
        .any(|key| normalize_name(&key.name) == wanted);

    if taken {
        return Err(AppError::DuplicateName(name.to_string()));
    }
    Ok(())
}
