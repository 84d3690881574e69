//! In-memory key store.
//!
//! Used when no database is configured and throughout the tests. Records are
//! kept newest first, so listing is a clone.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::api_key::{ApiKey, NewApiKey, normalize_name, trim_name};
use crate::store::KeyStore;

#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<Vec<ApiKey>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(keys: &[ApiKey], name: &str, except: Option<Uuid>) -> bool {
    let wanted = normalize_name(name);
    keys.iter()
        .filter(|key| Some(key.id) != except)
        .any(|key| normalize_name(&key.name) == wanted)
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn list(&self) -> Result<Vec<ApiKey>, AppError> {
        Ok(self.keys.read().await.clone())
    }

    async fn insert(&self, new_key: NewApiKey) -> Result<ApiKey, AppError> {
        let mut keys = self.keys.write().await;

        if name_taken(&keys, &new_key.name, None) {
            return Err(AppError::DuplicateName(trim_name(&new_key.name).to_string()));
        }
        // Mirrors the UNIQUE (key) constraint of the table, which surfaces as a store failure.
        if keys.iter().any(|key| key.secret == new_key.secret) {
            return Err(AppError::StoreUnavailable(
                "duplicate value for api_keys.key".into(),
            ));
        }

        let record = ApiKey {
            id: Uuid::new_v4(),
            name: new_key.name,
            secret: new_key.secret,
            monthly_limit: new_key.monthly_limit,
            current_usage: 0,
            created_at: Utc::now(),
        };
        keys.insert(0, record.clone());

        Ok(record)
    }

    async fn find_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, AppError> {
        let keys = self.keys.read().await;
        Ok(keys.iter().find(|key| key.secret == secret).cloned())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<ApiKey>, AppError> {
        let mut keys = self.keys.write().await;

        if !keys.iter().any(|key| key.id == id) {
            return Ok(None);
        }
        if name_taken(&keys, name, Some(id)) {
            return Err(AppError::DuplicateName(trim_name(name).to_string()));
        }

        let record = keys.iter_mut().find(|key| key.id == id).map(|key| {
            key.name = name.to_string();
            key.clone()
        });

        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut keys = self.keys.write().await;
        let before = keys.len();
        keys.retain(|key| key.id != id);
        Ok(keys.len() < before)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
